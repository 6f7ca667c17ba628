//! The parameter engine facade.
//!
//! Owns the table, the interpreter state, the options, the signal gate
//! and the diagnostic queue. Every public mutation runs inside a signal
//! defer bracket and reports failures through the central queue, handing
//! the caller an [`ErrorGuaranteed`] proof instead of a bare error.

use nush_diagnostic::{DiagnosticQueue, ErrorGuaranteed};

use crate::assign::{self, AssocEntry, Subscript};
use crate::environ::Environ;
use crate::errors::{ParamError, ParamResult};
use crate::flags::ParamFlags;
use crate::gsu::{param_get, Gsu, VarBinding};
use crate::options::ShellOptions;
use crate::signals::{DeferGuard, SignalGate};
use crate::special;
use crate::state::InterpreterState;
use crate::table::{self, ParamTable};
use crate::tie;
use crate::value::{is_identifier, Number, ParamType, ParamValue};

/// A read-only snapshot of one visible parameter, for display
/// collaborators. The value is obtained through the dispatch layer, so it
/// is never torn.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamView {
    pub name: String,
    pub ty: ParamType,
    pub flags: ParamFlags,
    pub value: ParamValue,
    pub level: u32,
}

/// The variable runtime of one interpreter instance.
pub struct ParamEngine {
    table: ParamTable,
    state: InterpreterState,
    options: ShellOptions,
    signals: SignalGate,
    diagnostics: DiagnosticQueue,
}

impl ParamEngine {
    /// Build an engine with the special registry installed.
    pub fn new(options: ShellOptions) -> ParamEngine {
        ParamEngine::with_state(options, InterpreterState::new())
    }

    /// Build an engine around pre-seeded interpreter state (process ids,
    /// seed values for the bound cells).
    pub fn with_state(options: ShellOptions, state: InterpreterState) -> ParamEngine {
        let mut table = ParamTable::new();
        special::install(&mut table, &state);
        ParamEngine {
            table,
            state,
            options,
            signals: SignalGate::new(),
            diagnostics: DiagnosticQueue::new(),
        }
    }

    pub fn options(&self) -> &ShellOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ShellOptions {
        &mut self.options
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut InterpreterState {
        &mut self.state
    }

    pub fn table(&self) -> &ParamTable {
        &self.table
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticQueue {
        &mut self.diagnostics
    }

    /// Record a signal arrival; returns true if it was deferred.
    pub fn note_signal(&mut self, signal: i32) -> bool {
        self.signals.note(signal)
    }

    /// Signals that arrived during deferred sections, in order.
    pub fn pending_signals(&mut self) -> Vec<i32> {
        self.signals.drain_pending()
    }

    /// The central error-reporting call: every recoverable failure funnels
    /// through here exactly once.
    fn report(&mut self, err: ParamError) -> ErrorGuaranteed {
        tracing::warn!(error = %err, "parameter operation failed");
        self.diagnostics.emit_error(err.into_diagnostic())
    }

    /// Run one mutation inside a signal defer bracket.
    fn run<T>(
        &mut self,
        op: impl FnOnce(&mut ParamTable, &mut InterpreterState, &ShellOptions) -> ParamResult<T>,
    ) -> Result<T, ErrorGuaranteed> {
        let result = {
            let _guard = DeferGuard::new(&mut self.signals);
            op(&mut self.table, &mut self.state, &self.options)
        };
        result.map_err(|err| self.report(err))
    }

    /// The live value of `name`, if any.
    pub fn get(&mut self, name: &str) -> Option<ParamValue> {
        let id = self.table.lookup_live(name)?;
        Some(param_get(&self.table, &mut self.state, id))
    }

    /// The live value of `name` rendered as text.
    pub fn get_scalar(&mut self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_scalar_text())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_scalar(&mut self, name: &str, text: impl Into<String>) -> Result<(), ErrorGuaranteed> {
        let text = text.into();
        self.run(|t, s, o| assign::assign_scalar(t, s, o, name, text, false).map(|_| ()))
    }

    /// `name+=text` append.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn append_scalar(&mut self, name: &str, text: impl Into<String>) -> Result<(), ErrorGuaranteed> {
        let text = text.into();
        self.run(|t, s, o| assign::assign_scalar(t, s, o, name, text, true).map(|_| ()))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_integer(&mut self, name: &str, n: i64) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_numeric(t, s, o, name, Number::Int(n), false).map(|_| ()))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_float(&mut self, name: &str, x: f64) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| {
            assign::assign_numeric(t, s, o, name, Number::Float(x), false).map(|_| ())
        })
    }

    /// `name+=n` numeric addition, promoting to float on mixed types.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn add_numeric(&mut self, name: &str, n: Number) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_numeric(t, s, o, name, n, true).map(|_| ()))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_array(&mut self, name: &str, words: Vec<String>) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_array(t, s, o, name, words, false).map(|_| ()))
    }

    /// `name+=(words)` append.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn append_array(&mut self, name: &str, words: Vec<String>) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_array(t, s, o, name, words, true).map(|_| ()))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_assoc(&mut self, name: &str, entries: Vec<AssocEntry>) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_assoc(t, s, o, name, entries, false).map(|_| ()))
    }

    /// Merge entries into an association, honoring per-entry append
    /// markers.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn merge_assoc(&mut self, name: &str, entries: Vec<AssocEntry>) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_assoc(t, s, o, name, entries, true).map(|_| ()))
    }

    /// Bulk-load an association from a flat `key value ...` list.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_assoc_pairs(&mut self, name: &str, words: Vec<String>) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_assoc_flat(t, s, o, name, words, false).map(|_| ()))
    }

    /// Write a resolved slice of an array.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_array_slice(
        &mut self,
        name: &str,
        sub: Subscript,
        words: Vec<String>,
    ) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::assign_array_slice(t, s, o, name, sub, words).map(|_| ()))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn unset(&mut self, name: &str) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::unset(t, s, o, name, true))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_exported(&mut self, name: &str, on: bool) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| assign::set_exported(t, s, o, name, on).map(|_| ()))
    }

    /// Turn the readonly flag on or off.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_readonly(&mut self, name: &str, on: bool) -> Result<(), ErrorGuaranteed> {
        self.run(|t, _s, o| assign::set_readonly(t, o, name, on).map(|_| ()))
    }

    /// Turn element deduplication on for an array.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn set_unique(&mut self, name: &str, on: bool) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, o| {
            let id = match t.lookup(name) {
                Some(id) => {
                    assign::guard_mutable(t, o, id)?;
                    id
                }
                None => t.create(name, ParamType::Array, ParamFlags::empty())?,
            };
            if on {
                t.param_mut(id).flags.insert(ParamFlags::UNIQUE);
                if t.param(id).flags.is_live() && t.param(id).ty() == ParamType::Array {
                    // Deduplicate the current contents immediately.
                    let current = param_get(t, s, id);
                    crate::gsu::param_set(t, s, id, current)?;
                }
            } else {
                t.param_mut(id).flags.remove(ParamFlags::UNIQUE);
            }
            Ok(())
        })
    }

    /// Tie a scalar and an array through a join character.
    #[tracing::instrument(level = "debug", skip_all, fields(scalar = %scalar_name, array = %array_name))]
    pub fn tie(
        &mut self,
        scalar_name: &str,
        array_name: &str,
        join: char,
    ) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, _o| tie::tie(t, s, scalar_name, array_name, join))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn untie(&mut self, name: &str) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, _o| tie::untie(t, s, name))
    }

    /// Declare `name` local to the current scope. Ordinary parameters
    /// shadow the outer record; specials stash their state and keep their
    /// binding.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    pub fn make_local(&mut self, name: &str, ty: ParamType) -> Result<(), ErrorGuaranteed> {
        self.run(|t, s, _o| {
            if !is_identifier(name) {
                return Err(ParamError::not_an_identifier(name));
            }
            let level = t.locallevel();
            match t.lookup(name) {
                Some(id) if t.param(id).flags.is_special() => {
                    if t.param(id).flags.is_readonly() {
                        return Err(ParamError::read_only(name));
                    }
                    if t.param(id).level < level {
                        table::make_local_special(t, s, id, ParamFlags::empty());
                    }
                    Ok(())
                }
                Some(id) if t.param(id).level == level => Ok(()),
                _ => t.create(name, ty, ParamFlags::LOCAL).map(|_| ()),
            }
        })
    }

    pub fn enter_scope(&mut self) {
        self.table.enter_scope();
    }

    /// Leave the current scope, restoring or destroying everything
    /// stamped deeper than the new level.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn exit_scope(&mut self) {
        let _guard = DeferGuard::new(&mut self.signals);
        table::exit_scope(&mut self.table, &mut self.state);
    }

    /// Switch the exposed representation of the shell timer.
    pub fn set_seconds_type(&mut self, float: bool) {
        if let Some(id) = self.table.lookup("SECONDS") {
            let param = self.table.param_mut(id);
            if matches!(param.gsu, Gsu::Var(VarBinding::Seconds { .. })) {
                param.gsu = Gsu::Var(VarBinding::Seconds { float });
                param.value = ParamValue::empty(if float {
                    ParamType::Float
                } else {
                    ParamType::Integer
                });
            }
        }
    }

    /// Seed the table from the startup environment.
    ///
    /// Entries with malformed names are skipped, as are specials flagged
    /// against import and names already imported from an earlier
    /// duplicate. Everything imported lands exported.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn import_environment<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.state.env = Environ::from_pairs(pairs);
        let entries: Vec<(String, String)> = self
            .state
            .env
            .entries()
            .iter()
            .filter_map(|e| crate::environ::split_entry(e))
            .map(|(n, v)| (n.to_owned(), v.to_owned()))
            .collect();

        for (name, value) in entries {
            if !is_identifier(&name) {
                continue;
            }
            if let Some(id) = self.table.lookup(&name) {
                let flags = self.table.param(id).flags;
                if flags.contains(ParamFlags::DONT_IMPORT) || flags.is_exported() {
                    continue;
                }
            }
            let assigned = assign::assign_scalar(
                &mut self.table,
                &mut self.state,
                &self.options,
                &name,
                value,
                false,
            );
            let imported = match assigned {
                Ok(_) => assign::set_exported(
                    &mut self.table,
                    &mut self.state,
                    &self.options,
                    &name,
                    true,
                )
                .map(|_| ()),
                Err(err) => Err(err),
            };
            if let Err(err) = imported {
                tracing::warn!(name = %name, error = %err, "skipped environment import");
            }
        }
        tracing::debug!(count = self.state.env.len(), "imported environment");
    }

    /// Snapshot every visible live parameter, sorted by name.
    pub fn visible(&mut self) -> Vec<ParamView> {
        let mut ids = self.table.visible_ids();
        ids.sort_by(|a, b| self.table.param(*a).name.cmp(&self.table.param(*b).name));
        let mut views = Vec::new();
        for id in ids {
            if !self.table.param(id).flags.is_live() {
                continue;
            }
            let value = param_get(&self.table, &mut self.state, id);
            let param = self.table.param(id);
            views.push(ParamView {
                name: param.name.clone(),
                ty: value.type_of(),
                flags: param.flags,
                value,
                level: param.level,
            });
        }
        views
    }
}
