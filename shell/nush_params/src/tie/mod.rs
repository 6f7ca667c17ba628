//! User-created scalar/array ties.
//!
//! `tie` links a scalar name and an array name through one join character:
//! the array owns the storage, the scalar joins on read and splits on
//! write. The built-in colon ties (`PATH`/`path` and friends) are wired by
//! the special registry instead and cannot be retied or untied here.

use crate::assign::sync_export;
use crate::errors::{ParamError, ParamResult};
use crate::flags::ParamFlags;
use crate::gsu::{param_get, param_set, Gsu};
use crate::state::InterpreterState;
use crate::table::{ParamId, ParamTable, TieLink};
use crate::value::{is_identifier, ParamType, ParamValue};

/// Link `scalar_name` and `array_name` as a tied pair.
///
/// An existing value on the scalar side wins and is split into the array;
/// otherwise an existing array shows through the scalar immediately.
pub fn tie(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    scalar_name: &str,
    array_name: &str,
    join: char,
) -> ParamResult<()> {
    if !is_identifier(scalar_name) {
        return Err(ParamError::not_an_identifier(scalar_name));
    }
    if !is_identifier(array_name) {
        return Err(ParamError::not_an_identifier(array_name));
    }
    if scalar_name == array_name {
        return Err(ParamError::already_declared(scalar_name));
    }
    for name in [scalar_name, array_name] {
        if let Some(id) = table.lookup(name) {
            let param = table.param(id);
            if param.flags.is_special() || param.flags.contains(ParamFlags::TIED) {
                return Err(ParamError::already_declared(name));
            }
            if param.flags.is_readonly() {
                return Err(ParamError::read_only(name));
            }
        }
    }

    // The scalar's current text, if it has one, seeds the pair.
    let seed = table
        .lookup_live(scalar_name)
        .map(|id| param_get(table, state, id).to_scalar_text());

    let array_id = ensure(table, array_name, ParamType::Array)?;
    table.param_mut(array_id).flags.insert(ParamFlags::TIED);
    table.param_mut(array_id).tie = Some(TieLink {
        partner: scalar_name.to_owned(),
        join,
    });

    let scalar_id = ensure(table, scalar_name, ParamType::Scalar)?;
    let scalar = table.param_mut(scalar_id);
    scalar.flags.insert(ParamFlags::TIED);
    scalar.gsu = Gsu::Tied;
    scalar.value = ParamValue::Scalar(String::new());
    scalar.tie = Some(TieLink {
        partner: array_name.to_owned(),
        join,
    });

    match seed {
        Some(text) => {
            param_set(table, state, scalar_id, ParamValue::Scalar(text))?;
        }
        None => {
            if table.param(array_id).flags.is_live() {
                // The scalar view is live as soon as the array is.
                table.param_mut(scalar_id).flags.remove(ParamFlags::UNSET);
            }
        }
    }
    sync_export(table, state, scalar_id);
    tracing::debug!(scalar = scalar_name, array = array_name, "tied parameters");
    Ok(())
}

/// Break the tie on `name` (either side may be named).
///
/// The array side stays an ordinary array; the scalar side keeps its last
/// joined text frozen in as a plain scalar.
pub fn untie(table: &mut ParamTable, state: &mut InterpreterState, name: &str) -> ParamResult<()> {
    let Some(id) = table.lookup(name) else {
        return Ok(());
    };
    if !table.param(id).flags.contains(ParamFlags::TIED) {
        return Ok(());
    }
    if table.param(id).flags.is_special() {
        return Err(ParamError::sys_failure(name, "cannot untie a special parameter"));
    }
    let partner = table.param(id).tie.as_ref().map(|t| t.partner.clone());
    sever(table, state, id);
    if let Some(partner_id) = partner.and_then(|p| table.lookup(&p)) {
        sever(table, state, partner_id);
    }
    Ok(())
}

/// Strip tie state from one record, freezing a scalar side's joined text.
pub(crate) fn sever(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId) {
    if table.param(id).gsu == Gsu::Tied {
        let frozen = param_get(table, state, id).to_scalar_text();
        let param = table.param_mut(id);
        param.gsu = Gsu::Standard;
        param.value = ParamValue::Scalar(frozen);
    }
    let param = table.param_mut(id);
    param.flags.remove(ParamFlags::TIED);
    param.tie = None;
}

fn ensure(table: &mut ParamTable, name: &str, ty: ParamType) -> ParamResult<ParamId> {
    match table.lookup(name) {
        Some(id) if table.param(id).ty() == ty => Ok(id),
        Some(id) if !table.param(id).flags.is_live() => {
            let param = table.param_mut(id);
            param.value = ParamValue::empty(ty);
            param.gsu = Gsu::Standard;
            Ok(id)
        }
        Some(id) => {
            // Wrong shape with a live value: the scalar seed was captured
            // already, so reshape in place.
            let param = table.param_mut(id);
            param.value = ParamValue::empty(ty);
            param.gsu = Gsu::Standard;
            param.flags.insert(ParamFlags::UNSET);
            Ok(id)
        }
        None => table.create(name, ty, ParamFlags::empty()),
    }
}

#[cfg(test)]
mod tests;
