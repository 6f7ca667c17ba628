use proptest::prelude::*;

use crate::engine::ParamEngine;
use crate::options::ShellOptions;
use crate::value::ParamValue;

proptest! {
    /// Writing either half of a tied pair leaves the two views consistent:
    /// the scalar is always the join of the array.
    #[test]
    fn tied_views_stay_consistent(words in proptest::collection::vec("[a-z]{1,8}", 0..8)) {
        let mut eng = ParamEngine::new(ShellOptions::default());
        eng.tie("JOINED", "parts", ':').unwrap();

        eng.set_array("parts", words.clone()).unwrap();
        prop_assert_eq!(eng.get_scalar("JOINED"), Some(words.join(":")));

        eng.set_scalar("JOINED", words.join(":")).unwrap();
        prop_assert_eq!(eng.get("parts"), Some(ParamValue::Array(words)));
    }

    /// Any scalar text survives a set/get round trip, and unsetting an
    /// ordinary parameter removes its record entirely.
    #[test]
    fn scalar_set_get_unset_round_trip(text in ".*") {
        let mut eng = ParamEngine::new(ShellOptions::default());
        eng.set_scalar("subject", text.clone()).unwrap();
        prop_assert_eq!(eng.get_scalar("subject"), Some(text));

        eng.unset("subject").unwrap();
        prop_assert!(eng.get("subject").is_none());
        prop_assert!(eng.table().lookup("subject").is_none());
    }

    /// Numeric augmentation of an integer cell is plain addition.
    #[test]
    fn integer_augment_adds(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let mut eng = ParamEngine::new(ShellOptions::default());
        eng.set_integer("n", a).unwrap();
        eng.add_numeric("n", crate::value::Number::Int(b)).unwrap();
        prop_assert_eq!(eng.get("n"), Some(ParamValue::Integer(a + b)));
    }
}
