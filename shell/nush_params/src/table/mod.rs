//! The scoped parameter table.
//!
//! Records live in an arena addressed by `ParamId`; the visible map holds
//! exactly one id per name. A shadowed record stays allocated, linked from
//! the record that hides it, until the hiding scope unwinds.
//!
//! Scope depth is one monotonic counter. Entering a scope changes nothing
//! else; locals appear lazily when a declaration stamps the current level.

use rustc_hash::FxHashMap;

use crate::errors::{ParamError, ParamResult};
use crate::flags::ParamFlags;
use crate::gsu::{Gsu, VarBinding};
use crate::state::InterpreterState;
use crate::value::{is_identifier, ParamType, ParamValue};

/// Arena index of one parameter record.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParamId(u32);

impl ParamId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The tie linkage shared by both halves of a scalar/array pair.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TieLink {
    /// Name of the companion parameter.
    pub partner: String,
    /// Separator joining array elements into the scalar view.
    pub join: char,
}

/// Saved state of a localized special parameter.
///
/// Specials are never shadowed through the visible map; their localness is
/// synthesized by stashing the old state on the live record. The visible
/// record keeps its dispatch binding throughout.
#[derive(Clone, Debug)]
pub struct SpecialStash {
    /// Snapshot of the old value. For the shell timer this is the raw
    /// origin, not the reading, so time keeps flowing under the local.
    pub value: ParamValue,
    pub flags: ParamFlags,
    pub gsu: Gsu,
    pub base: u32,
    pub width: u32,
    pub level: u32,
}

/// One variable binding.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub flags: ParamFlags,
    pub value: ParamValue,
    pub gsu: Gsu,
    /// Scope depth at creation; 0 is global.
    pub level: u32,
    /// The record this one hides, if any.
    pub shadow: Option<ParamId>,
    /// The `NAME=value` text last installed in the environment;
    /// present iff currently exported.
    pub env_entry: Option<String>,
    pub tie: Option<TieLink>,
    /// Output base for integer display; 0 means decimal.
    pub base: u32,
    /// Pad width for the justify flags; 0 means none.
    pub width: u32,
    /// Saved state while a special is localized.
    pub stash: Option<Box<SpecialStash>>,
}

impl Param {
    fn new(name: &str, ty: ParamType, flags: ParamFlags, level: u32, shadow: Option<ParamId>) -> Param {
        Param {
            name: name.to_owned(),
            flags: flags | ParamFlags::UNSET,
            value: ParamValue::empty(ty),
            gsu: Gsu::Standard,
            level,
            shadow,
            env_entry: None,
            tie: None,
            base: 0,
            width: 0,
            stash: None,
        }
    }

    /// The parameter's type tag. Stable across unset; changing it means
    /// destroying and recreating the record.
    #[inline]
    pub fn ty(&self) -> ParamType {
        self.value.type_of()
    }
}

/// The scoped name-to-parameter mapping.
#[derive(Debug, Default)]
pub struct ParamTable {
    slots: Vec<Option<Param>>,
    free: Vec<u32>,
    visible: FxHashMap<String, ParamId>,
    locallevel: u32,
}

impl ParamTable {
    pub fn new() -> ParamTable {
        ParamTable::default()
    }

    /// Current scope depth.
    #[inline]
    pub fn locallevel(&self) -> u32 {
        self.locallevel
    }

    /// Enter a nested scope. Locals appear lazily afterwards.
    pub fn enter_scope(&mut self) {
        self.locallevel += 1;
        tracing::debug!(level = self.locallevel, "entered parameter scope");
    }

    pub(crate) fn pop_level(&mut self) {
        self.locallevel = self.locallevel.saturating_sub(1);
        tracing::debug!(level = self.locallevel, "left parameter scope");
    }

    /// The visible record for `name`, unset placeholders included.
    pub fn lookup(&self, name: &str) -> Option<ParamId> {
        self.visible.get(name).copied()
    }

    /// The visible record for `name`, skipping unset placeholders.
    pub fn lookup_live(&self, name: &str) -> Option<ParamId> {
        self.lookup(name)
            .filter(|&id| self.param(id).flags.is_live())
    }

    pub fn param(&self, id: ParamId) -> &Param {
        match self.slots.get(id.index()).and_then(Option::as_ref) {
            Some(param) => param,
            None => panic!("dangling parameter id {}", id.0),
        }
    }

    pub fn param_mut(&mut self, id: ParamId) -> &mut Param {
        match self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            Some(param) => param,
            None => panic!("dangling parameter id {}", id.0),
        }
    }

    /// Ids of every visible record, in no particular order.
    pub fn visible_ids(&self) -> Vec<ParamId> {
        self.visible.values().copied().collect()
    }

    /// Number of visible records.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Locate or insert the record for a declaration at the current level.
    ///
    /// A same-level unset non-special record is reused in place. A record
    /// from an outer level is shadowed. A live same-level record that is
    /// readonly or special rejects the declaration; a plain one is reset
    /// to the requested type, the destroy-and-recreate path.
    pub fn create(&mut self, name: &str, ty: ParamType, flags: ParamFlags) -> ParamResult<ParamId> {
        if !is_identifier(name) {
            return Err(ParamError::not_an_identifier(name));
        }
        let level = self.locallevel;
        let Some(id) = self.lookup(name) else {
            return Ok(self.insert_new(name, ty, flags, level, None));
        };

        let existing = self.param(id);
        if existing.level == level {
            if existing.flags.is_special() {
                return Err(ParamError::already_declared(name));
            }
            if existing.flags.is_live() && existing.flags.is_readonly() {
                return Err(ParamError::already_declared(name));
            }
            // Reuse in place: stale formatting state is dropped, the
            // requested flags are merged in.
            let param = self.param_mut(id);
            param.flags.remove(ParamFlags::JUSTIFY);
            param.flags.insert(flags);
            param.flags.insert(ParamFlags::UNSET);
            param.value = ParamValue::empty(ty);
            param.gsu = Gsu::Standard;
            param.tie = None;
            param.base = 0;
            param.width = 0;
            return Ok(id);
        }

        if existing.flags.is_special() {
            // Specials are localized by stashing, never by table insertion.
            return Err(ParamError::already_declared(name));
        }
        let new_id = self.insert_new(name, ty, flags, level, Some(id));
        Ok(new_id)
    }

    fn insert_new(
        &mut self,
        name: &str,
        ty: ParamType,
        flags: ParamFlags,
        level: u32,
        shadow: Option<ParamId>,
    ) -> ParamId {
        let id = self.alloc(Param::new(name, ty, flags, level, shadow));
        self.visible.insert(name.to_owned(), id);
        id
    }

    /// Install a fully built record as the visible entry for its name.
    /// Used by the special registry at bootstrap.
    pub(crate) fn install(&mut self, param: Param) -> ParamId {
        let name = param.name.clone();
        let id = self.alloc(param);
        self.visible.insert(name, id);
        id
    }

    /// Unlink the visible record for `name`, promoting its shadow if one
    /// exists. Returns the removed record.
    pub(crate) fn remove_promote(&mut self, name: &str) -> Option<(Param, Option<ParamId>)> {
        let id = self.visible.remove(name)?;
        let removed = self.dealloc(id);
        let promoted = removed.shadow;
        if let Some(shadow_id) = promoted {
            self.visible.insert(name.to_owned(), shadow_id);
        }
        Some((removed, promoted))
    }

    fn alloc(&mut self, param: Param) -> ParamId {
        if let Some(i) = self.free.pop() {
            self.slots[i as usize] = Some(param);
            ParamId(i)
        } else {
            self.slots.push(Some(param));
            ParamId(u32::try_from(self.slots.len() - 1).unwrap_or(u32::MAX))
        }
    }

    fn dealloc(&mut self, id: ParamId) -> Param {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(param) => {
                self.free.push(id.0);
                param
            }
            None => panic!("dangling parameter id {}", id.0),
        }
    }
}

/// Synthesize localness for a special: stash the old state on the live
/// record, stamp the current level, and reset the exposed value. The
/// dispatch binding stays on the visible record throughout.
pub fn make_local_special(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    id: ParamId,
    extra_flags: ParamFlags,
) {
    let snapshot = match table.param(id).gsu {
        Gsu::Var(VarBinding::Seconds { .. }) => ParamValue::Float(state.seconds.raw_offset()),
        _ => crate::gsu::param_get(table, state, id),
    };
    let level = table.locallevel();
    let param = table.param_mut(id);
    let stash = SpecialStash {
        value: snapshot,
        flags: param.flags,
        gsu: param.gsu,
        base: param.base,
        width: param.width,
        level: param.level,
    };
    param.stash = Some(Box::new(stash));
    param.level = level;
    param.flags.insert(ParamFlags::LOCAL | ParamFlags::UNSET | extra_flags);
    tracing::debug!(name = %param.name, "localized special parameter");
}

/// Leave the current scope: one pass over the table tears down or
/// restores every record stamped deeper than the new level.
pub fn exit_scope(table: &mut ParamTable, state: &mut InterpreterState) {
    table.pop_level();
    let level = table.locallevel();
    for id in table.visible_ids() {
        if table.param(id).level <= level {
            continue;
        }
        if table.param(id).flags.is_special() {
            restore_special(table, state, id);
        } else {
            destroy_local(table, state, id);
        }
    }
}

fn restore_special(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId) {
    let Some(stash) = table.param_mut(id).stash.take() else {
        table.param_mut(id).level = 0;
        return;
    };
    let skip_restore = table.param(id).flags.contains(ParamFlags::NO_RESTORE);

    let param = table.param_mut(id);
    param.gsu = stash.gsu;
    param.base = stash.base;
    param.width = stash.width;
    param.level = stash.level;

    if !skip_restore {
        if let Gsu::Var(VarBinding::Seconds { .. }) = stash.gsu {
            if let ParamValue::Float(raw) = stash.value {
                state.seconds.restore_raw(raw);
            }
        } else if stash.flags.is_live() {
            // Restore through the dispatch binding so cell-backed
            // specials get their side effects replayed. A failed side
            // effect leaves the cell as the local set it; the scope
            // teardown itself must still complete.
            if let Err(err) = crate::gsu::param_set(table, state, id, stash.value) {
                tracing::warn!(
                    name = %table.param(id).name,
                    error = %err,
                    "could not restore localized special parameter"
                );
            }
        } else {
            crate::gsu::param_unset(table, state, id);
        }
    }
    table.param_mut(id).flags = stash.flags;
    crate::assign::sync_export(table, state, id);
}

fn destroy_local(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId) {
    crate::gsu::param_unset(table, state, id);
    let name = table.param(id).name.clone();
    if table.param(id).env_entry.is_some() {
        state.env.remove(&name);
    }
    if let Some((_, Some(promoted))) = table.remove_promote(&name) {
        // The outer record becomes visible again; if it is exported its
        // environment entry comes back with it.
        crate::assign::sync_export(table, state, promoted);
    }
}

#[cfg(test)]
mod tests;
