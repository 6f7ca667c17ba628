use pretty_assertions::assert_eq;

use super::{exit_scope, ParamTable};
use crate::errors::ParamErrorKind;
use crate::flags::ParamFlags;
use crate::gsu::param_set;
use crate::state::InterpreterState;
use crate::value::{ParamType, ParamValue};

fn set_scalar(table: &mut ParamTable, state: &mut InterpreterState, name: &str, text: &str) {
    let id = table
        .create(name, ParamType::Scalar, ParamFlags::empty())
        .unwrap();
    param_set(table, state, id, ParamValue::Scalar(text.to_owned())).unwrap();
}

#[test]
fn create_rejects_malformed_names() {
    let mut table = ParamTable::new();
    let err = table
        .create("2bad", ParamType::Scalar, ParamFlags::empty())
        .unwrap_err();
    assert_eq!(
        err.kind,
        ParamErrorKind::NotAnIdentifier {
            name: "2bad".to_owned()
        }
    );
}

#[test]
fn created_records_start_unset_at_the_current_level() {
    let mut table = ParamTable::new();
    table.enter_scope();
    let id = table
        .create("x", ParamType::Array, ParamFlags::LOCAL)
        .unwrap();
    let param = table.param(id);
    assert_eq!(param.level, 1);
    assert!(!param.flags.is_live());
    assert_eq!(param.ty(), ParamType::Array);
    assert!(table.lookup("x").is_some());
    assert!(table.lookup_live("x").is_none());
}

#[test]
fn same_level_unset_record_is_reused_in_place() {
    let mut table = ParamTable::new();
    let first = table
        .create("x", ParamType::Scalar, ParamFlags::LEFT_JUSTIFY)
        .unwrap();
    table.param_mut(first).width = 8;

    let second = table
        .create("x", ParamType::Integer, ParamFlags::EXPORTED)
        .unwrap();
    assert_eq!(first, second);
    let param = table.param(second);
    assert_eq!(param.ty(), ParamType::Integer);
    assert_eq!(param.width, 0, "stale formatting state must be dropped");
    assert!(param.flags.is_exported());
}

#[test]
fn same_level_readonly_record_rejects_redeclaration() {
    let mut table = ParamTable::new();
    let mut state = InterpreterState::new();
    let id = table
        .create("x", ParamType::Scalar, ParamFlags::READONLY)
        .unwrap();
    param_set(&mut table, &mut state, id, ParamValue::Scalar("v".to_owned())).unwrap();

    let err = table
        .create("x", ParamType::Scalar, ParamFlags::empty())
        .unwrap_err();
    assert_eq!(
        err.kind,
        ParamErrorKind::AlreadyDeclared {
            name: "x".to_owned()
        }
    );
}

#[test]
fn outer_record_is_shadowed_not_replaced() {
    let mut table = ParamTable::new();
    let mut state = InterpreterState::new();
    set_scalar(&mut table, &mut state, "x", "outer");
    let outer_id = table.lookup("x").unwrap();

    table.enter_scope();
    set_scalar(&mut table, &mut state, "x", "inner");
    let inner_id = table.lookup("x").unwrap();

    assert_ne!(outer_id, inner_id);
    assert_eq!(table.param(inner_id).shadow, Some(outer_id));
    assert_eq!(table.param(inner_id).level, 1);
    assert_eq!(
        table.param(outer_id).value,
        ParamValue::Scalar("outer".to_owned())
    );
}

#[test]
fn exit_scope_promotes_the_shadow() {
    let mut table = ParamTable::new();
    let mut state = InterpreterState::new();
    set_scalar(&mut table, &mut state, "x", "outer");

    table.enter_scope();
    set_scalar(&mut table, &mut state, "x", "inner");
    exit_scope(&mut table, &mut state);

    let id = table.lookup("x").unwrap();
    assert_eq!(table.param(id).value, ParamValue::Scalar("outer".to_owned()));
    assert_eq!(table.param(id).level, 0);
    assert_eq!(table.locallevel(), 0);
}

#[test]
fn exit_scope_destroys_locals_without_shadows() {
    let mut table = ParamTable::new();
    let mut state = InterpreterState::new();

    table.enter_scope();
    set_scalar(&mut table, &mut state, "only_local", "v");
    assert!(table.lookup("only_local").is_some());
    exit_scope(&mut table, &mut state);

    assert!(table.lookup("only_local").is_none());
    assert!(table.is_empty());
}

#[test]
fn globals_survive_scope_churn() {
    let mut table = ParamTable::new();
    let mut state = InterpreterState::new();
    set_scalar(&mut table, &mut state, "g", "global");

    table.enter_scope();
    table.enter_scope();
    exit_scope(&mut table, &mut state);
    exit_scope(&mut table, &mut state);

    let id = table.lookup("g").unwrap();
    assert_eq!(table.param(id).value, ParamValue::Scalar("global".to_owned()));
}
