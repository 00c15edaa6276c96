//! End-to-end tests for the filter pipeline: raw string in, JSON predicate
//! mapping out, exercised through the public API only.

use serde_json::json;

use provql_rs::filter::{translate_filter, FilterError};
use provql_rs::schema::{EntityKind, FieldSet};

fn translated(input: &str) -> serde_json::Value {
    let map = translate_filter(input, None)
        .unwrap_or_else(|err| panic!("'{input}' should translate, got: {err}"));
    serde_json::to_value(&map).unwrap()
}

#[test]
fn test_reference_filter_strings() {
    let cases = [
        ("a==1", json!({"a": {"==": 1}})),
        ("a_bc>='d'", json!({"a_bc": {">=": "d"}})),
        ("a.b<=c", json!({"a.b": {"<=": "c"}})),
        ("a != 1.0", json!({"a": {"!=": 1.0}})),
        ("a==2020-01-01", json!({"a": {"==": "2020-01-01"}})),
        ("a==2020-01-01 10:11", json!({"a": {"==": "2020-01-01T10:11:00"}})),
        ("a == 1 AND b == 2", json!({"a": {"==": 1}, "b": {"==": 2}})),
        ("a LIKE \"x%\"", json!({"a": {"like": "x%"}})),
        ("a iLIKE \"x%\"", json!({"a": {"ilike": "x%"}})),
        ("a ILIKE \"x%\"", json!({"a": {"ilike": "x%"}})),
        ("a LENGTH 33", json!({"a": {"of_length": 33}})),
        ("a OF LENGTH 33", json!({"a": {"of_length": 33}})),
        ("a IN 1", json!({"a": {"in": [1]}})),
        ("a IS IN 1", json!({"a": {"in": [1]}})),
        ("a IN 1,2,3", json!({"a": {"in": [1, 2, 3]}})),
        ("a IN x,y,z", json!({"a": {"in": ["x", "y", "z"]}})),
        ("a IN \"x\",\"y\",\"z\"", json!({"a": {"in": ["x", "y", "z"]}})),
        ("a CONTAINS 1,2", json!({"a": {"contains": [1, 2]}})),
        ("a HAS \"x\"", json!({"a": {"has_key": "x"}})),
        ("a HAS KEY \"y\"", json!({"a": {"has_key": "y"}})),
        (
            "a < 2 & a >=1 & a == 3",
            json!({"a": {"and": [{"<": 2}, {">=": 1}, {"==": 3}]}}),
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(translated(input), expected, "input: {input}");
    }
}

#[test]
fn test_in_valuelist_of_integers() {
    assert_eq!(
        translated("id IN 45,56,78"),
        json!({"id": {"in": [45, 56, 78]}})
    );
}

#[test]
fn test_date_comparison_without_spaces() {
    assert_eq!(
        translated("mtime>=2019-04-23"),
        json!({"mtime": {">=": "2019-04-23"}})
    );
}

#[test]
fn test_ilike_pattern_passes_through() {
    assert_eq!(
        translated("first_name ILIKE 'aii%'"),
        json!({"first_name": {"ilike": "aii%"}})
    );
}

#[test]
fn test_string_value_with_dots() {
    assert_eq!(
        translated("node_type == 'data.dict.Dict.'"),
        json!({"node_type": {"==": "data.dict.Dict."}})
    );
}

#[test]
fn test_key_set_is_the_distinct_property_paths() {
    let map = translate_filter(
        "node_type ILIKE '%Calc%' & mtime >= 2018-02-01 & mtime < 2019-01-01",
        None,
    )
    .unwrap();
    let paths: Vec<&str> = map.paths().collect();
    assert_eq!(paths, vec!["mtime", "node_type"]);
}

#[test]
fn test_blank_filter_selects_everything() {
    let map = translate_filter("", None).unwrap();
    assert!(map.is_empty());
    assert_eq!(serde_json::to_value(&map).unwrap(), json!({}));
}

#[test]
fn test_missing_valuelist_is_a_parse_error() {
    assert!(matches!(
        translate_filter("id IN", None).unwrap_err(),
        FilterError::Parse(_)
    ));
}

#[test]
fn test_digit_leading_property_is_a_lex_error() {
    assert!(matches!(
        translate_filter("1abc > 3", None).unwrap_err(),
        FilterError::Lex(_)
    ));
}

#[test]
fn test_unterminated_string_is_a_lex_error() {
    assert!(matches!(
        translate_filter("a == 'oops", None).unwrap_err(),
        FilterError::Lex(_)
    ));
}

#[test]
fn test_double_equals_not_equal_is_a_lex_error() {
    assert!(matches!(
        translate_filter("a !== 1", None).unwrap_err(),
        FilterError::Lex(_)
    ));
}

#[test]
fn test_entity_schema_validation() {
    let fields = FieldSet::for_entity(EntityKind::Node);

    assert!(translate_filter("node_type ILIKE '%Calc%'", Some(&fields)).is_ok());
    assert!(translate_filter("attributes.energy > 0.5", Some(&fields)).is_ok());

    let err = translate_filter("secret_field == 1", Some(&fields)).unwrap_err();
    assert!(matches!(err, FilterError::Semantic(_)));
}

#[test]
fn test_unknown_field_error_names_the_path() {
    let fields = FieldSet::new(["id"]);
    let err = translate_filter("secret_field == 1", Some(&fields)).unwrap_err();
    assert!(err.to_string().contains("secret_field"));
}

#[test]
fn test_computer_relation_style_path() {
    assert_eq!(
        translated("dbcomputer.scheduler_type == 'slurm'"),
        json!({"dbcomputer.scheduler_type": {"==": "slurm"}})
    );
}
