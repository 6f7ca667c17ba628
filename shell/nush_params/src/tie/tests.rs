use pretty_assertions::assert_eq;

use super::{tie, untie};
use crate::assign::{assign_array, assign_scalar, unset};
use crate::errors::ParamErrorKind;
use crate::gsu::param_get;
use crate::options::ShellOptions;
use crate::special;
use crate::state::InterpreterState;
use crate::table::ParamTable;
use crate::value::ParamValue;

struct Fixture {
    table: ParamTable,
    state: InterpreterState,
    opts: ShellOptions,
}

fn fixture() -> Fixture {
    Fixture {
        table: ParamTable::new(),
        state: InterpreterState::new(),
        opts: ShellOptions::default(),
    }
}

impl Fixture {
    fn get(&mut self, name: &str) -> ParamValue {
        let id = self.table.lookup(name).unwrap();
        param_get(&self.table, &mut self.state, id)
    }
}

#[test]
fn scalar_writes_show_through_the_array() {
    let mut fx = fixture();
    tie(&mut fx.table, &mut fx.state, "S", "a_side", ':').unwrap();
    assign_scalar(
        &mut fx.table,
        &mut fx.state,
        &fx.opts,
        "S",
        "a:b".to_owned(),
        false,
    )
    .unwrap();
    assert_eq!(
        fx.get("a_side"),
        ParamValue::Array(vec!["a".to_owned(), "b".to_owned()])
    );
}

#[test]
fn array_writes_show_through_the_scalar() {
    let mut fx = fixture();
    tie(&mut fx.table, &mut fx.state, "S", "a_side", ':').unwrap();
    assign_array(
        &mut fx.table,
        &mut fx.state,
        &fx.opts,
        "a_side",
        vec!["x".to_owned(), "y".to_owned()],
        false,
    )
    .unwrap();
    assert_eq!(fx.get("S"), ParamValue::Scalar("x:y".to_owned()));
}

#[test]
fn existing_scalar_value_seeds_the_pair() {
    let mut fx = fixture();
    assign_scalar(
        &mut fx.table,
        &mut fx.state,
        &fx.opts,
        "S",
        "one,two".to_owned(),
        false,
    )
    .unwrap();
    tie(&mut fx.table, &mut fx.state, "S", "parts", ',').unwrap();
    assert_eq!(
        fx.get("parts"),
        ParamValue::Array(vec!["one".to_owned(), "two".to_owned()])
    );
}

#[test]
fn tying_a_special_is_rejected() {
    let mut fx = fixture();
    special::install(&mut fx.table, &fx.state);
    let err = tie(&mut fx.table, &mut fx.state, "IFS", "ifs_parts", ':').unwrap_err();
    assert_eq!(
        err.kind,
        ParamErrorKind::AlreadyDeclared {
            name: "IFS".to_owned()
        }
    );
}

#[test]
fn double_tie_is_rejected() {
    let mut fx = fixture();
    tie(&mut fx.table, &mut fx.state, "S", "arr", ':').unwrap();
    let err = tie(&mut fx.table, &mut fx.state, "S", "other", ':').unwrap_err();
    assert_eq!(
        err.kind,
        ParamErrorKind::AlreadyDeclared {
            name: "S".to_owned()
        }
    );
}

#[test]
fn untie_freezes_the_scalar_and_frees_the_array() {
    let mut fx = fixture();
    tie(&mut fx.table, &mut fx.state, "S", "arr", ':').unwrap();
    assign_array(
        &mut fx.table,
        &mut fx.state,
        &fx.opts,
        "arr",
        vec!["a".to_owned(), "b".to_owned()],
        false,
    )
    .unwrap();

    untie(&mut fx.table, &mut fx.state, "S").unwrap();
    assert_eq!(fx.get("S"), ParamValue::Scalar("a:b".to_owned()));

    // The sides are independent now.
    assign_array(
        &mut fx.table,
        &mut fx.state,
        &fx.opts,
        "arr",
        vec!["changed".to_owned()],
        false,
    )
    .unwrap();
    assert_eq!(fx.get("S"), ParamValue::Scalar("a:b".to_owned()));
}

#[test]
fn unset_of_either_side_dissolves_a_user_tie() {
    let mut fx = fixture();
    tie(&mut fx.table, &mut fx.state, "S", "arr", ':').unwrap();
    assign_scalar(
        &mut fx.table,
        &mut fx.state,
        &fx.opts,
        "S",
        "a:b".to_owned(),
        false,
    )
    .unwrap();

    unset(&mut fx.table, &mut fx.state, &fx.opts, "arr", true).unwrap();
    assert!(fx.table.lookup("arr").is_none());
    assert!(fx.table.lookup("S").is_none());
}

#[test]
fn untying_a_builtin_tie_is_rejected() {
    let mut fx = fixture();
    special::install(&mut fx.table, &fx.state);
    let err = untie(&mut fx.table, &mut fx.state, "PATH").unwrap_err();
    assert_eq!(
        err.kind,
        ParamErrorKind::SysFailure {
            name: "PATH".to_owned(),
            detail: "cannot untie a special parameter".to_owned(),
        }
    );
}
