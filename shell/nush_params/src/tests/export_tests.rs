use pretty_assertions::assert_eq;

use crate::engine::ParamEngine;
use crate::options::ShellOptions;

fn engine() -> ParamEngine {
    ParamEngine::new(ShellOptions::default())
}

#[test]
fn exported_values_track_every_assignment() {
    let mut eng = engine();
    eng.set_scalar("x", "1").unwrap();
    eng.set_exported("x", true).unwrap();
    assert_eq!(eng.state().env.get("x"), Some("1"));

    eng.set_scalar("x", "2").unwrap();
    assert_eq!(eng.state().env.get("x"), Some("2"));
}

#[test]
fn unexport_removes_the_entry_promptly() {
    let mut eng = engine();
    eng.set_scalar("x", "1").unwrap();
    eng.set_exported("x", true).unwrap();
    eng.set_exported("x", false).unwrap();
    assert!(!eng.state().env.contains("x"));
}

#[test]
fn unset_removes_the_entry_promptly() {
    let mut eng = engine();
    eng.set_scalar("x", "1").unwrap();
    eng.set_exported("x", true).unwrap();
    eng.unset("x").unwrap();
    assert!(!eng.state().env.contains("x"));
}

#[test]
fn arrays_are_never_mirrored() {
    let mut eng = engine();
    eng.set_array("arr", vec!["a".to_owned()]).unwrap();
    eng.set_exported("arr", true).unwrap();
    assert!(!eng.state().env.contains("arr"));
}

#[test]
fn exported_tied_scalar_mirrors_the_joined_view() {
    let mut eng = engine();
    eng.tie("CLASSPATH", "classpath", ':').unwrap();
    eng.set_exported("CLASSPATH", true).unwrap();
    eng.set_array(
        "classpath",
        vec!["/a.jar".to_owned(), "/b.jar".to_owned()],
    )
    .unwrap();
    assert_eq!(eng.state().env.get("CLASSPATH"), Some("/a.jar:/b.jar"));
}

#[test]
fn array_half_write_refreshes_the_exported_scalar_entry() {
    let mut eng = engine();
    eng.set_scalar("PATH", "/bin").unwrap();
    eng.set_exported("PATH", true).unwrap();
    assert_eq!(eng.state().env.get("PATH"), Some("/bin"));

    eng.set_array(
        "path",
        vec!["/bin".to_owned(), "/usr/bin".to_owned()],
    )
    .unwrap();
    assert_eq!(eng.state().env.get("PATH"), Some("/bin:/usr/bin"));

    eng.append_array("path", vec!["/sbin".to_owned()]).unwrap();
    assert_eq!(eng.state().env.get("PATH"), Some("/bin:/usr/bin:/sbin"));
}

#[test]
fn attribute_toggles_respect_the_readonly_guard() {
    let mut eng = engine();
    eng.set_scalar("x", "v").unwrap();
    eng.set_readonly("x", true).unwrap();
    // Re-marking is a no-op, not a violation.
    eng.set_readonly("x", true).unwrap();

    assert!(eng.set_exported("x", true).is_err());
    assert!(!eng.state().env.contains("x"));
    assert!(eng.set_readonly("x", false).is_err());
    assert!(eng.set_unique("x", true).is_err());
    assert_eq!(eng.get_scalar("x").as_deref(), Some("v"));
}

#[test]
fn shadowed_export_comes_back_after_scope_exit() {
    let mut eng = engine();
    eng.set_scalar("x", "outer").unwrap();
    eng.set_exported("x", true).unwrap();

    eng.enter_scope();
    eng.make_local("x", crate::value::ParamType::Scalar).unwrap();
    eng.set_scalar("x", "inner").unwrap();
    eng.set_exported("x", true).unwrap();
    assert_eq!(eng.state().env.get("x"), Some("inner"));
    eng.exit_scope();

    assert_eq!(eng.state().env.get("x"), Some("outer"));
}

#[test]
fn an_unexported_local_leaves_the_outer_entry_alone() {
    let mut eng = engine();
    eng.set_scalar("x", "outer").unwrap();
    eng.set_exported("x", true).unwrap();

    eng.enter_scope();
    eng.make_local("x", crate::value::ParamType::Scalar).unwrap();
    eng.unset("x").unwrap();
    // The hidden global still owns its environment entry.
    assert_eq!(eng.state().env.get("x"), Some("outer"));
    eng.exit_scope();

    assert_eq!(eng.state().env.get("x"), Some("outer"));
}
