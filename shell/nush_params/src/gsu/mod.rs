//! Get/set/unset dispatch.
//!
//! Every parameter behavior flows through one of four dispatch variants,
//! matched exhaustively. `Standard` reads and writes the record's own
//! storage; `NullSet` discards writes; `Var` redirects to a fixed
//! interpreter cell, performing that binding's side effect; `Tied` joins
//! and splits through the partner array.
//!
//! Operations take the table and interpreter state by reference and a
//! record id, never a borrowed record, so a tied get can chase its partner
//! without aliasing the record being read.

use crate::errors::{ParamError, ParamResult};
use crate::flags::ParamFlags;
use crate::state::InterpreterState;
use crate::table::{ParamId, ParamTable};
use crate::value::{join, split, uniq, ParamType, ParamValue};

/// The interpreter cell a `Var` dispatch variant is wired to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarBinding {
    /// PRNG state; get advances, set reseeds.
    Random,
    /// Monotonic shell timer; `float` selects the exposed representation.
    Seconds { float: bool },
    /// Identity cells; set performs the privileged id change.
    Uid,
    Euid,
    Gid,
    Egid,
    /// Identity change by user name.
    Username,
    /// Home directory cache; set reindexes named directories.
    Home,
    /// Terminal type; set reinitializes the terminal.
    Term,
    /// Terminfo locations; set re-exports before reinitializing.
    Terminfo,
    TerminfoDirs,
    /// Field separator cell.
    Ifs,
    /// Word-character set; set rebuilds the character type table.
    Wordchars,
    /// Plain integer cells.
    Shlvl,
    Optind,
    /// Array cells; the `path` write invalidates the command hash.
    PathArr,
    CdpathArr,
    FpathArr,
}

/// The dispatch variant of one parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Gsu {
    /// Read and write `Param.value` directly.
    Standard,
    /// Get reads stored value; set silently discards its argument.
    NullSet,
    /// Redirect to an interpreter cell.
    Var(VarBinding),
    /// Scalar half of a tied pair: get joins, set splits.
    Tied,
}

/// Read a parameter's value through its dispatch variant.
///
/// Takes the state mutably: a `RANDOM` read advances the generator.
pub fn param_get(table: &ParamTable, state: &mut InterpreterState, id: ParamId) -> ParamValue {
    let param = table.param(id);
    match param.gsu {
        Gsu::Standard | Gsu::NullSet => param.value.clone(),
        Gsu::Var(binding) => var_get(state, binding),
        Gsu::Tied => {
            let Some(tie) = param.tie.clone() else {
                return ParamValue::Scalar(String::new());
            };
            let joined = match table.lookup(&tie.partner) {
                Some(partner_id) => match param_get(table, state, partner_id) {
                    ParamValue::Array(words) => join(&words, tie.join),
                    other => other.to_scalar_text(),
                },
                None => String::new(),
            };
            ParamValue::Scalar(joined)
        }
    }
}

/// Write a parameter's value through its dispatch variant.
///
/// Rejects values of the wrong shape; the assignment protocol performs
/// any type coercion before calling here. On success the unset bit is
/// cleared, on both halves of a tied pair. No partial mutation is left
/// behind on failure.
pub fn param_set(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    id: ParamId,
    value: ParamValue,
) -> ParamResult<()> {
    set_value(table, state, id, value)?;
    // A write through either half of a tie makes both views live.
    let partner = table.param(id).tie.as_ref().map(|t| t.partner.clone());
    if let Some(partner_id) = partner.and_then(|p| table.lookup(&p)) {
        table.param_mut(partner_id).flags.remove(ParamFlags::UNSET);
    }
    Ok(())
}

fn set_value(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    id: ParamId,
    value: ParamValue,
) -> ParamResult<()> {
    let gsu = table.param(id).gsu;
    match gsu {
        Gsu::Standard => {
            let param = table.param_mut(id);
            let expected = param.value.type_of();
            let got = value.type_of();
            if expected != got {
                return Err(ParamError::type_mismatch(&param.name, expected, got));
            }
            let mut value = value;
            if let ParamValue::Array(words) = &mut value {
                if param.flags.contains(ParamFlags::UNIQUE) {
                    uniq(words);
                }
            }
            param.value = value;
            param.flags.remove(ParamFlags::UNSET);
            Ok(())
        }
        Gsu::NullSet => Ok(()),
        Gsu::Var(binding) => {
            var_set(table, state, id, binding, value)?;
            table.param_mut(id).flags.remove(ParamFlags::UNSET);
            Ok(())
        }
        Gsu::Tied => {
            let param = table.param(id);
            let name = param.name.clone();
            let Some(tie) = param.tie.clone() else {
                return Err(ParamError::type_mismatch(
                    &name,
                    ParamType::Scalar,
                    value.type_of(),
                ));
            };
            let ParamValue::Scalar(text) = value else {
                return Err(ParamError::type_mismatch(
                    &name,
                    ParamType::Scalar,
                    value.type_of(),
                ));
            };
            if let Some(partner_id) = table.lookup(&tie.partner) {
                let words = split(&text, tie.join);
                param_set(table, state, partner_id, ParamValue::Array(words))?;
            }
            table.param_mut(id).flags.remove(ParamFlags::UNSET);
            Ok(())
        }
    }
}

/// Reset a parameter through its dispatch variant and mark it unset.
///
/// Tied teardown and environment removal are the caller's business; this
/// only resets storage and the bound cell.
pub fn param_unset(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId) {
    let gsu = table.param(id).gsu;
    match gsu {
        Gsu::Standard => {
            let param = table.param_mut(id);
            param.value = ParamValue::empty(param.value.type_of());
        }
        Gsu::NullSet | Gsu::Tied => {}
        Gsu::Var(binding) => var_unset(state, binding),
    }
    table.param_mut(id).flags.insert(ParamFlags::UNSET);
}

fn var_get(state: &mut InterpreterState, binding: VarBinding) -> ParamValue {
    match binding {
        VarBinding::Random => ParamValue::Integer(state.prng.next()),
        VarBinding::Seconds { float } => {
            let now = state.seconds.now();
            if float {
                ParamValue::Float(now)
            } else {
                // Truncation toward zero, the integer representation.
                ParamValue::Integer(now as i64)
            }
        }
        VarBinding::Uid => ParamValue::Integer(state.ids.uid),
        VarBinding::Euid => ParamValue::Integer(state.ids.euid),
        VarBinding::Gid => ParamValue::Integer(state.ids.gid),
        VarBinding::Egid => ParamValue::Integer(state.ids.egid),
        VarBinding::Username => ParamValue::Scalar(state.ids.username.clone()),
        VarBinding::Home => ParamValue::Scalar(state.home.clone()),
        VarBinding::Term => ParamValue::Scalar(state.term.clone()),
        VarBinding::Terminfo => ParamValue::Scalar(state.terminfo.clone()),
        VarBinding::TerminfoDirs => ParamValue::Scalar(state.terminfo_dirs.clone()),
        VarBinding::Ifs => ParamValue::Scalar(state.ifs.clone()),
        VarBinding::Wordchars => ParamValue::Scalar(state.wordchars.clone()),
        VarBinding::Shlvl => ParamValue::Integer(state.shlvl),
        VarBinding::Optind => ParamValue::Integer(state.optind),
        VarBinding::PathArr => ParamValue::Array(state.path.clone()),
        VarBinding::CdpathArr => ParamValue::Array(state.cdpath.clone()),
        VarBinding::FpathArr => ParamValue::Array(state.fpath.clone()),
    }
}

fn var_set(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    id: ParamId,
    binding: VarBinding,
    value: ParamValue,
) -> ParamResult<()> {
    let name = table.param(id).name.clone();
    match binding {
        VarBinding::Random => {
            let n = expect_integer(&name, &value)?;
            state.prng.seed(n as u32);
        }
        VarBinding::Seconds { .. } => {
            let x = expect_number(&name, &value)?;
            state.seconds.set(x);
        }
        VarBinding::Uid => {
            let n = expect_integer(&name, &value)?;
            if !state.ids.set_uid(n) {
                return Err(ParamError::sys_failure(&name, "operation not permitted"));
            }
        }
        VarBinding::Euid => {
            let n = expect_integer(&name, &value)?;
            if !state.ids.set_euid(n) {
                return Err(ParamError::sys_failure(&name, "operation not permitted"));
            }
        }
        VarBinding::Gid => {
            let n = expect_integer(&name, &value)?;
            if !state.ids.set_gid(n) {
                return Err(ParamError::sys_failure(&name, "operation not permitted"));
            }
        }
        VarBinding::Egid => {
            let n = expect_integer(&name, &value)?;
            if !state.ids.set_egid(n) {
                return Err(ParamError::sys_failure(&name, "operation not permitted"));
            }
        }
        VarBinding::Username => {
            let text = expect_scalar(&name, value)?;
            if !state.ids.set_username(&text) {
                return Err(ParamError::sys_failure(&name, "operation not permitted"));
            }
        }
        VarBinding::Home => {
            state.home = expect_scalar(&name, value)?;
            state.effects.dir_reindexes += 1;
        }
        VarBinding::Term => {
            state.term = expect_scalar(&name, value)?;
            state.effects.term_reinits += 1;
        }
        VarBinding::Terminfo | VarBinding::TerminfoDirs => {
            let text = expect_scalar(&name, value)?;
            if binding == VarBinding::Terminfo {
                state.terminfo = text.clone();
            } else {
                state.terminfo_dirs = text.clone();
            }
            // The environment entry must be current before the terminal
            // reads it during reinitialization.
            if table.param(id).flags.is_exported() {
                state.env.put(&name, &text);
                table.param_mut(id).env_entry = Some(format!("{name}={text}"));
            }
            state.effects.term_reinits += 1;
        }
        VarBinding::Ifs => {
            state.ifs = expect_scalar(&name, value)?;
        }
        VarBinding::Wordchars => {
            state.wordchars = expect_scalar(&name, value)?;
            state.effects.typtab_rebuilds += 1;
        }
        VarBinding::Shlvl => {
            state.shlvl = expect_integer(&name, &value)?;
        }
        VarBinding::Optind => {
            state.optind = expect_integer(&name, &value)?;
        }
        VarBinding::PathArr => {
            state.path = expect_array(table, id, &name, value)?;
            state.effects.cmd_hash_invalidations += 1;
        }
        VarBinding::CdpathArr => {
            state.cdpath = expect_array(table, id, &name, value)?;
        }
        VarBinding::FpathArr => {
            state.fpath = expect_array(table, id, &name, value)?;
        }
    }
    Ok(())
}

fn var_unset(state: &mut InterpreterState, binding: VarBinding) {
    match binding {
        VarBinding::Random
        | VarBinding::Seconds { .. }
        | VarBinding::Uid
        | VarBinding::Euid
        | VarBinding::Gid
        | VarBinding::Egid
        | VarBinding::Username => {}
        VarBinding::Home => state.home.clear(),
        VarBinding::Term => state.term.clear(),
        VarBinding::Terminfo => state.terminfo.clear(),
        VarBinding::TerminfoDirs => state.terminfo_dirs.clear(),
        VarBinding::Ifs => state.ifs.clear(),
        VarBinding::Wordchars => {
            state.wordchars.clear();
            state.effects.typtab_rebuilds += 1;
        }
        VarBinding::Shlvl => state.shlvl = 0,
        VarBinding::Optind => state.optind = 0,
        VarBinding::PathArr => {
            state.path.clear();
            state.effects.cmd_hash_invalidations += 1;
        }
        VarBinding::CdpathArr => state.cdpath.clear(),
        VarBinding::FpathArr => state.fpath.clear(),
    }
}

fn expect_integer(name: &str, value: &ParamValue) -> ParamResult<i64> {
    match value {
        ParamValue::Integer(n) => Ok(*n),
        other => Err(ParamError::type_mismatch(
            name,
            ParamType::Integer,
            other.type_of(),
        )),
    }
}

fn expect_number(name: &str, value: &ParamValue) -> ParamResult<f64> {
    match value {
        ParamValue::Integer(n) => Ok(*n as f64),
        ParamValue::Float(x) => Ok(*x),
        other => Err(ParamError::type_mismatch(
            name,
            ParamType::Float,
            other.type_of(),
        )),
    }
}

fn expect_scalar(name: &str, value: ParamValue) -> ParamResult<String> {
    match value {
        ParamValue::Scalar(s) => Ok(s),
        other => Err(ParamError::type_mismatch(
            name,
            ParamType::Scalar,
            other.type_of(),
        )),
    }
}

fn expect_array(
    table: &ParamTable,
    id: ParamId,
    name: &str,
    value: ParamValue,
) -> ParamResult<Vec<String>> {
    match value {
        ParamValue::Array(mut words) => {
            if table.param(id).flags.contains(ParamFlags::UNIQUE) {
                uniq(&mut words);
            }
            Ok(words)
        }
        other => Err(ParamError::type_mismatch(
            name,
            ParamType::Array,
            other.type_of(),
        )),
    }
}
