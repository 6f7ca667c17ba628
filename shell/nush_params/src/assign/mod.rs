//! The assignment protocol.
//!
//! Entry points differ by the shape of the incoming value but share one
//! contract: resolve or create the target, enforce the readonly and
//! restricted rules, coerce types by destroy-and-recreate (never by
//! mutating a live record's variant), apply augment semantics per type,
//! then write through the dispatch layer and resynchronize the
//! environment.

use crate::errors::{ParamError, ParamResult};
use crate::flags::ParamFlags;
use crate::gsu::{param_get, param_set, param_unset, Gsu, VarBinding};
use crate::options::ShellOptions;
use crate::state::InterpreterState;
use crate::table::{Param, ParamId, ParamTable};
use crate::value::{join, Number, ParamType, ParamValue};

use rustc_hash::FxHashMap;

/// A resolved slice descriptor, supplied by the subscript collaborator.
///
/// Indices are 1-based and the range is inclusive; `end < start` is the
/// zero-length range, an insertion point. `inverted` counts both indices
/// from the end of the array instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Subscript {
    pub start: isize,
    pub end: isize,
    pub inverted: bool,
}

/// One entry of a key/value bulk load. `augment` appends to the existing
/// value for that key instead of replacing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssocEntry {
    pub key: String,
    pub value: String,
    pub augment: bool,
}

impl AssocEntry {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> AssocEntry {
        AssocEntry {
            key: key.into(),
            value: value.into(),
            augment: false,
        }
    }

    pub fn append(key: impl Into<String>, value: impl Into<String>) -> AssocEntry {
        AssocEntry {
            key: key.into(),
            value: value.into(),
            augment: true,
        }
    }
}

/// Assign scalar text to `name`, with `+=` append semantics when
/// `augment` is set.
pub fn assign_scalar(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    text: String,
    augment: bool,
) -> ParamResult<ParamId> {
    let Some(id) = table.lookup(name) else {
        let id = create_new(table, opts, name, ParamType::Scalar)?;
        param_set(table, state, id, ParamValue::Scalar(text))?;
        return Ok(finish(table, state, id));
    };
    guard_mutable(table, opts, id)?;

    if table.param(id).gsu == Gsu::Tied {
        let new_text = if augment {
            let mut old = param_get(table, state, id).to_scalar_text();
            old.push_str(&text);
            old
        } else {
            text
        };
        param_set(table, state, id, ParamValue::Scalar(new_text))?;
        return Ok(finish(table, state, id));
    }

    match table.param(id).ty() {
        ParamType::Scalar => {
            let new_text = if augment && table.param(id).flags.is_live() {
                let mut old = param_get(table, state, id).to_scalar_text();
                old.push_str(&text);
                old
            } else {
                text
            };
            param_set(table, state, id, ParamValue::Scalar(new_text))?;
        }
        ParamType::Integer | ParamType::Float => {
            let ty = table.param(id).ty();
            let Some(n) = Number::parse(&text) else {
                return Err(ParamError::type_mismatch(name, ty, ParamType::Scalar));
            };
            let n = if augment {
                current_number(table, state, id).add(n)
            } else {
                n
            };
            param_set(table, state, id, numeric_value(table, id, n))?;
        }
        ParamType::Array => {
            if opts.ksh_arrays {
                // A scalar write targets element zero of the array.
                let index = ksh_first_index(opts);
                write_slice(
                    table,
                    state,
                    opts,
                    id,
                    Subscript {
                        start: index,
                        end: index,
                        inverted: false,
                    },
                    vec![text],
                )?;
            } else if augment {
                let mut words = current_array(table, state, id);
                words.push(text);
                param_set(table, state, id, ParamValue::Array(words))?;
            } else if table.param(id).flags.is_special() {
                return Err(ParamError::type_mismatch(name, ParamType::Array, ParamType::Scalar));
            } else {
                recreate_as(table, state, id, ParamType::Scalar);
                param_set(table, state, id, ParamValue::Scalar(text))?;
            }
        }
        ParamType::Assoc => {
            if augment || table.param(id).flags.is_special() {
                return Err(ParamError::type_mismatch(name, ParamType::Assoc, ParamType::Scalar));
            }
            recreate_as(table, state, id, ParamType::Scalar);
            param_set(table, state, id, ParamValue::Scalar(text))?;
        }
    }
    Ok(finish(table, state, id))
}

/// Assign an already-evaluated number to `name`.
pub fn assign_numeric(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    n: Number,
    augment: bool,
) -> ParamResult<ParamId> {
    let Some(id) = table.lookup(name) else {
        let ty = match n {
            Number::Int(_) => ParamType::Integer,
            Number::Float(_) => ParamType::Float,
        };
        let id = create_new(table, opts, name, ty)?;
        param_set(table, state, id, n.to_value())?;
        return Ok(finish(table, state, id));
    };
    guard_mutable(table, opts, id)?;

    match table.param(id).ty() {
        ParamType::Integer | ParamType::Float => {
            let n = if augment {
                current_number(table, state, id).add(n)
            } else {
                n
            };
            param_set(table, state, id, numeric_value(table, id, n))?;
            Ok(finish(table, state, id))
        }
        // Text-shaped targets take the rendered number.
        _ => assign_scalar(table, state, opts, name, n.to_value().to_scalar_text(), augment),
    }
}

/// Replace or append whole-array contents.
pub fn assign_array(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    words: Vec<String>,
    augment: bool,
) -> ParamResult<ParamId> {
    let Some(id) = table.lookup(name) else {
        let id = create_new(table, opts, name, ParamType::Array)?;
        param_set(table, state, id, ParamValue::Array(words))?;
        return Ok(finish(table, state, id));
    };
    guard_mutable(table, opts, id)?;

    if table.param(id).gsu == Gsu::Tied {
        // The tied scalar takes the words joined on its tie character.
        let sep = table.param(id).tie.as_ref().map_or(':', |t| t.join);
        let joined = join(&words, sep);
        return assign_scalar(table, state, opts, name, joined, augment);
    }

    match table.param(id).ty() {
        ParamType::Array => {
            let words = if augment {
                let mut all = current_array(table, state, id);
                all.extend(words);
                all
            } else {
                words
            };
            param_set(table, state, id, ParamValue::Array(words))?;
        }
        ParamType::Assoc => {
            // A flat word list against an association is a key/value load.
            return assign_assoc_flat(table, state, opts, name, words, augment);
        }
        scalar_ty => {
            if table.param(id).flags.is_special() {
                return Err(ParamError::type_mismatch(name, scalar_ty, ParamType::Array));
            }
            let mut all = Vec::new();
            if augment && table.param(id).flags.is_live() {
                all.push(param_get(table, state, id).to_scalar_text());
            }
            all.extend(words);
            recreate_as(table, state, id, ParamType::Array);
            param_set(table, state, id, ParamValue::Array(all))?;
        }
    }
    Ok(finish(table, state, id))
}

/// Bulk-load an association from explicit entries.
pub fn assign_assoc(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    entries: Vec<AssocEntry>,
    augment: bool,
) -> ParamResult<ParamId> {
    let id = match table.lookup(name) {
        Some(id) => {
            guard_mutable(table, opts, id)?;
            match table.param(id).ty() {
                ParamType::Assoc => id,
                other if table.param(id).flags.is_special() => {
                    return Err(ParamError::type_mismatch(name, other, ParamType::Assoc));
                }
                _ => {
                    recreate_as(table, state, id, ParamType::Assoc);
                    id
                }
            }
        }
        None => create_new(table, opts, name, ParamType::Assoc)?,
    };

    let mut map: FxHashMap<String, String> = if augment {
        match param_get(table, state, id) {
            ParamValue::Assoc(map) => map,
            _ => FxHashMap::default(),
        }
    } else {
        FxHashMap::default()
    };
    for entry in entries {
        if entry.augment {
            if let Some(existing) = map.get_mut(&entry.key) {
                existing.push_str(&entry.value);
                continue;
            }
        }
        map.insert(entry.key, entry.value);
    }
    param_set(table, state, id, ParamValue::Assoc(map))?;
    Ok(finish(table, state, id))
}

/// Bulk-load an association from a flat `key value key value` list.
/// An odd element count is malformed.
pub fn assign_assoc_flat(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    words: Vec<String>,
    augment: bool,
) -> ParamResult<ParamId> {
    if words.len() % 2 != 0 {
        return Err(ParamError::malformed_key_value_list(name, words.len()));
    }
    let mut entries = Vec::with_capacity(words.len() / 2);
    let mut iter = words.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        entries.push(AssocEntry::set(key, value));
    }
    assign_assoc(table, state, opts, name, entries, augment)
}

/// Write a resolved slice of an array. Never changes the target's type or
/// level; creates an empty array first if the name is new.
pub fn assign_array_slice(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    sub: Subscript,
    words: Vec<String>,
) -> ParamResult<ParamId> {
    let id = match table.lookup(name) {
        Some(id) => id,
        None => create_new(table, opts, name, ParamType::Array)?,
    };
    guard_mutable(table, opts, id)?;
    if table.param(id).ty() != ParamType::Array {
        return Err(ParamError::type_mismatch(
            name,
            ParamType::Array,
            table.param(id).ty(),
        ));
    }
    write_slice(table, state, opts, id, sub, words)?;
    Ok(finish(table, state, id))
}

/// Remove a parameter.
///
/// Specials are reset and stay in the table. A local at the current level
/// leaves an unset placeholder that keeps hiding any outer record until
/// the scope ends. Anything else is unlinked, promoting its shadow.
pub fn unset(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    _explicit: bool,
) -> ParamResult<()> {
    let Some(id) = table.lookup(name) else {
        return Ok(());
    };
    let flags = table.param(id).flags;
    if flags.is_readonly() {
        return Err(ParamError::read_only(name));
    }
    if opts.restricted && flags.is_restricted() {
        return Err(ParamError::restricted(name));
    }

    if flags.contains(ParamFlags::TIED) {
        let partner = table.param(id).tie.as_ref().map(|t| t.partner.clone());
        if flags.is_special() {
            // Both halves reset in place; the binding survives.
            param_unset(table, state, id);
            sync_export(table, state, id);
            if let Some(partner_id) = partner.and_then(|p| table.lookup(&p)) {
                param_unset(table, state, partner_id);
                sync_export(table, state, partner_id);
            }
            return Ok(());
        }
        // User ties dissolve: both sides become ordinary and go away.
        crate::tie::sever(table, state, id);
        if let Some(partner_id) = partner.as_deref().and_then(|p| table.lookup(p)) {
            crate::tie::sever(table, state, partner_id);
            remove_ordinary(table, state, partner_id);
        }
        remove_ordinary(table, state, id);
        return Ok(());
    }

    if flags.is_special() {
        param_unset(table, state, id);
        sync_export(table, state, id);
        return Ok(());
    }

    remove_ordinary(table, state, id);
    Ok(())
}

/// Turn the export flag on or off, creating a declared-but-unset record
/// when the name is new. The environment entry follows immediately.
/// Readonly and restricted parameters reject attribute changes like any
/// other mutation.
pub fn set_exported(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    name: &str,
    on: bool,
) -> ParamResult<ParamId> {
    let id = match table.lookup(name) {
        Some(id) => {
            if table.param(id).flags.is_exported() == on {
                return Ok(id);
            }
            guard_mutable(table, opts, id)?;
            id
        }
        None => table.create(name, ParamType::Scalar, ParamFlags::empty())?,
    };
    if on {
        table.param_mut(id).flags.insert(ParamFlags::EXPORTED);
    } else {
        table.param_mut(id).flags.remove(ParamFlags::EXPORTED);
    }
    sync_export(table, state, id);
    Ok(id)
}

/// Turn the readonly flag on or off. Marking an already-readonly record
/// readonly again is a no-op; removing the flag from one is rejected.
pub fn set_readonly(
    table: &mut ParamTable,
    opts: &ShellOptions,
    name: &str,
    on: bool,
) -> ParamResult<ParamId> {
    let id = match table.lookup(name) {
        Some(id) => {
            if table.param(id).flags.is_readonly() == on {
                return Ok(id);
            }
            guard_mutable(table, opts, id)?;
            id
        }
        None => table.create(name, ParamType::Scalar, ParamFlags::empty())?,
    };
    if on {
        table.param_mut(id).flags.insert(ParamFlags::READONLY);
    } else {
        table.param_mut(id).flags.remove(ParamFlags::READONLY);
    }
    Ok(id)
}

/// Bring the environment mirror in line with one record: exported live
/// flat values get a current `NAME=value` entry, everything else loses
/// its entry promptly.
pub fn sync_export(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId) {
    let param = table.param(id);
    let name = param.name.clone();
    let exportable = param.ty().is_exportable() || param.gsu == Gsu::Tied;
    if param.flags.is_exported() && param.flags.is_live() && exportable {
        let text = param_get(table, state, id).to_scalar_text();
        state.env.put(&name, &text);
        table.param_mut(id).env_entry = Some(format!("{name}={text}"));
    } else if table.param_mut(id).env_entry.take().is_some() {
        state.env.remove(&name);
    }
}

fn remove_ordinary(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId) {
    param_unset(table, state, id);
    sync_export(table, state, id);
    let level = table.param(id).level;
    if level > 0 && level == table.locallevel() {
        // Placeholder until the scope ends; keeps hiding the outer record.
        return;
    }
    let name = table.param(id).name.clone();
    if let Some((_, Some(promoted))) = table.remove_promote(&name) {
        sync_export(table, state, promoted);
    }
}

pub(crate) fn guard_mutable(table: &ParamTable, opts: &ShellOptions, id: ParamId) -> ParamResult<()> {
    let param = table.param(id);
    if param.flags.is_readonly() {
        return Err(ParamError::read_only(&param.name));
    }
    if opts.restricted && param.flags.is_restricted() {
        return Err(ParamError::restricted(&param.name));
    }
    Ok(())
}

fn create_new(
    table: &mut ParamTable,
    opts: &ShellOptions,
    name: &str,
    ty: ParamType,
) -> ParamResult<ParamId> {
    let mut flags = ParamFlags::empty();
    if opts.all_export {
        flags |= ParamFlags::EXPORTED;
    }
    table.create(name, ty, flags)
}

fn finish(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId) -> ParamId {
    table.param_mut(id).flags.remove(ParamFlags::DEFAULTED);
    sync_export(table, state, id);
    // An array-half write changes the tied scalar's joined view, so its
    // environment entry must follow.
    let partner = table.param(id).tie.as_ref().map(|t| t.partner.clone());
    if let Some(partner_id) = partner.and_then(|p| table.lookup(&p)) {
        if table.param(partner_id).gsu == Gsu::Tied {
            sync_export(table, state, partner_id);
        }
    }
    id
}

/// Replace the record's shape, keeping identity, scope and the flags that
/// survive a type change. The old storage is released through the unset
/// path first; the caller writes the new value immediately after.
fn recreate_as(table: &mut ParamTable, state: &mut InterpreterState, id: ParamId, ty: ParamType) {
    param_unset(table, state, id);
    let old = table.param(id);
    let kept = old.flags
        & (ParamFlags::EXPORTED
            | ParamFlags::LOCAL
            | ParamFlags::UNIQUE
            | ParamFlags::RESTRICTED);
    let fresh = Param {
        name: old.name.clone(),
        flags: kept | ParamFlags::UNSET,
        value: ParamValue::empty(ty),
        gsu: Gsu::Standard,
        level: old.level,
        shadow: old.shadow,
        env_entry: old.env_entry.clone(),
        tie: None,
        base: 0,
        width: 0,
        stash: None,
    };
    *table.param_mut(id) = fresh;
}

fn current_number(table: &ParamTable, state: &mut InterpreterState, id: ParamId) -> Number {
    match param_get(table, state, id) {
        ParamValue::Integer(n) => Number::Int(n),
        ParamValue::Float(x) => Number::Float(x),
        other => Number::parse(&other.to_scalar_text()).unwrap_or(Number::Int(0)),
    }
}

fn current_array(table: &ParamTable, state: &mut InterpreterState, id: ParamId) -> Vec<String> {
    match param_get(table, state, id) {
        ParamValue::Array(words) => words,
        _ => Vec::new(),
    }
}

/// Coerce a number to the target's declared numeric type: an integer
/// target truncates a float result, a float target widens an integer.
fn numeric_value(table: &ParamTable, id: ParamId, n: Number) -> ParamValue {
    match table.param(id).gsu {
        // The timer accepts either representation.
        Gsu::Var(VarBinding::Seconds { .. }) => n.to_value(),
        _ => match table.param(id).ty() {
            ParamType::Float => ParamValue::Float(n.as_f64()),
            _ => ParamValue::Integer(match n {
                Number::Int(i) => i,
                Number::Float(x) => x as i64,
            }),
        },
    }
}

fn ksh_first_index(opts: &ShellOptions) -> isize {
    if opts.ksh_zero_subscript {
        0
    } else {
        1
    }
}

fn write_slice(
    table: &mut ParamTable,
    state: &mut InterpreterState,
    opts: &ShellOptions,
    id: ParamId,
    sub: Subscript,
    words: Vec<String>,
) -> ParamResult<()> {
    let name = table.param(id).name.clone();
    let mut arr = current_array(table, state, id);
    let len = arr.len() as isize;

    let (mut start, mut end) = if sub.inverted {
        (len + 1 - sub.end, len + 1 - sub.start)
    } else {
        (sub.start, sub.end)
    };
    if start == 0 {
        start = 1;
        if end == 0 && opts.ksh_zero_subscript {
            // Subscript zero names the first element, so the zero-length
            // range at zero replaces it instead of inserting before it.
            end = 1;
        }
    }
    if start < 0 || end < start - 1 {
        return Err(ParamError::invalid_subscript(&name, sub.start, sub.end));
    }

    let from = (start - 1) as usize;
    // Inclusive 1-based end is exclusive 0-based end.
    let to = end.max(start - 1) as usize;
    if from > arr.len() {
        arr.resize(from, String::new());
    }
    let upper = to.min(arr.len());
    arr.splice(from..upper, words);
    param_set(table, state, id, ParamValue::Array(arr))
}
