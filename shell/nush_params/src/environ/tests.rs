use pretty_assertions::assert_eq;

use super::{split_entry, Environ};

#[test]
fn put_replaces_in_place() {
    let mut env = Environ::new();
    env.put("A", "1");
    env.put("B", "2");
    env.put("A", "3");
    assert_eq!(env.entries(), ["A=3", "B=2"]);
    assert_eq!(env.get("A"), Some("3"));
}

#[test]
fn remove_deletes_the_entry() {
    let mut env = Environ::new();
    env.put("HOME", "/home/u");
    assert!(env.remove("HOME"));
    assert!(!env.remove("HOME"));
    assert!(env.is_empty());
}

#[test]
fn from_pairs_keeps_first_duplicate() {
    let env = Environ::from_pairs([("X", "first"), ("Y", "y"), ("X", "second")]);
    assert_eq!(env.get("X"), Some("first"));
    assert_eq!(env.len(), 2);
}

#[test]
fn values_may_contain_equals_signs() {
    let mut env = Environ::new();
    env.put("EXPR", "a=b=c");
    assert_eq!(env.get("EXPR"), Some("a=b=c"));
    assert_eq!(split_entry("EXPR=a=b=c"), Some(("EXPR", "a=b=c")));
    assert_eq!(split_entry("broken"), None);
}
