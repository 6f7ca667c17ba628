use pretty_assertions::assert_eq;

use super::{format_float, is_identifier, join, split, uniq, Number, ParamType, ParamValue};

#[test]
fn type_tags_match_variants() {
    assert_eq!(ParamValue::Scalar(String::new()).type_of(), ParamType::Scalar);
    assert_eq!(ParamValue::Integer(0).type_of(), ParamType::Integer);
    assert_eq!(ParamValue::Array(vec![]).type_of(), ParamType::Array);
}

#[test]
fn only_flat_types_are_exportable() {
    assert!(ParamType::Scalar.is_exportable());
    assert!(ParamType::Integer.is_exportable());
    assert!(ParamType::Float.is_exportable());
    assert!(!ParamType::Array.is_exportable());
    assert!(!ParamType::Assoc.is_exportable());
}

#[test]
fn join_and_split_round_trip() {
    let words = vec!["/bin".to_owned(), "/usr/bin".to_owned(), String::new()];
    let joined = join(&words, ':');
    assert_eq!(joined, "/bin:/usr/bin:");
    assert_eq!(split(&joined, ':'), words);
}

#[test]
fn split_of_empty_text_is_empty_array() {
    assert_eq!(split("", ':'), Vec::<String>::new());
    assert_eq!(join(&[], ':'), "");
}

#[test]
fn uniq_keeps_first_occurrence_in_order() {
    let mut words: Vec<String> = ["a", "b", "a", "c", "b"].iter().map(|s| (*s).to_owned()).collect();
    uniq(&mut words);
    assert_eq!(words, vec!["a", "b", "c"]);
}

#[test]
fn number_addition_promotes_mixed_types() {
    assert_eq!(Number::Int(3).add(Number::Int(4)), Number::Int(7));
    assert_eq!(Number::Int(1).add(Number::Float(0.5)), Number::Float(1.5));
    assert_eq!(Number::Float(1.5).add(Number::Float(1.5)), Number::Float(3.0));
}

#[test]
fn number_parse_handles_literals_only() {
    assert_eq!(Number::parse("42"), Some(Number::Int(42)));
    assert_eq!(Number::parse("-7"), Some(Number::Int(-7)));
    assert_eq!(Number::parse("2.5"), Some(Number::Float(2.5)));
    assert_eq!(Number::parse(""), Some(Number::Int(0)));
    assert_eq!(Number::parse("1+1"), None);
}

#[test]
fn whole_floats_render_with_trailing_point() {
    assert_eq!(format_float(3.0), "3.");
    assert_eq!(format_float(2.5), "2.5");
}

#[test]
fn identifier_validation() {
    assert!(is_identifier("PATH"));
    assert!(is_identifier("_x9"));
    assert!(!is_identifier("9lives"));
    assert!(!is_identifier("a-b"));
    assert!(!is_identifier(""));
}

#[test]
fn scalar_text_rendering() {
    assert_eq!(ParamValue::Integer(12).to_scalar_text(), "12");
    assert_eq!(
        ParamValue::Array(vec!["a".to_owned(), "b".to_owned()]).to_scalar_text(),
        "a b"
    );
}
