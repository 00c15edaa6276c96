//! Property tests for the filter pipeline.
//!
//! The pipeline is a pure function of its input string, so arbitrary inputs
//! can be replayed freely: no input may panic, valid inputs must translate
//! deterministically, and the output key set must be exactly the distinct
//! property paths of the input.

use std::collections::BTreeSet;

use proptest::prelude::*;

use provql_rs::filter::translate_filter;

fn path_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z_0-9]{0,8}"
}

fn operator_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["<", "<=", ">", ">=", "==", "!="])
}

proptest! {
    #[test]
    fn arbitrary_input_never_panics(input in ".{0,120}") {
        let _ = translate_filter(&input, None);
    }

    #[test]
    fn generated_conjunctions_translate(
        comparisons in prop::collection::vec(
            (path_strategy(), operator_strategy(), any::<i32>()),
            1..6,
        )
    ) {
        let input = comparisons
            .iter()
            .map(|(path, op, value)| format!("{path} {op} {value}"))
            .collect::<Vec<_>>()
            .join(" AND ");

        let map = translate_filter(&input, None).unwrap();

        let expected: BTreeSet<&str> =
            comparisons.iter().map(|(path, _, _)| path.as_str()).collect();
        let produced: BTreeSet<&str> = map.paths().collect();
        prop_assert_eq!(produced, expected);
    }

    #[test]
    fn translation_is_deterministic(
        path in path_strategy(),
        value in any::<i64>(),
    ) {
        let input = format!("{path} == {value}");
        let first = translate_filter(&input, None).unwrap();
        let second = translate_filter(&input, None).unwrap();
        prop_assert_eq!(first, second);
    }
}
