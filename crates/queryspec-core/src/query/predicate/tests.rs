use super::*;
use crate::{
    error::BuildError,
    model::FieldKind,
    query::path::FieldPath,
    value::{Float64, Truth, Value},
};

fn cmp(path: &str, op: CompareOp, value: impl Into<Value>) -> Predicate {
    Predicate::compare(path, op, value)
}

struct TestScope;

impl FieldScope for TestScope {
    fn scope_name(&self) -> String {
        "Test".to_string()
    }

    fn field_kind(&self, path: &str) -> Option<FieldKind> {
        match path {
            "id" => Some(FieldKind::Uint),
            "name" => Some(FieldKind::Text),
            "flags" => Some(FieldKind::Int),
            "score" => Some(FieldKind::Float),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------
// normalization
// ---------------------------------------------------------------------

#[test]
fn normalize_flattens_nested_junctions() {
    let a = cmp("a", CompareOp::Eq, 1);
    let b = cmp("b", CompareOp::Eq, 2);
    let c = cmp("c", CompareOp::Eq, 3);

    let nested = Predicate::And(vec![a.clone(), Predicate::And(vec![b.clone(), c.clone()])]);

    assert_eq!(normalize(&nested), Predicate::And(vec![a, b, c]));
}

#[test]
fn normalize_folds_neutral_and_absorbing_constants() {
    let a = cmp("a", CompareOp::Eq, 1);

    assert_eq!(
        normalize(&Predicate::And(vec![Predicate::True, a.clone()])),
        a
    );
    assert_eq!(
        normalize(&Predicate::And(vec![a.clone(), Predicate::False])),
        Predicate::False
    );
    assert_eq!(
        normalize(&Predicate::Or(vec![a.clone(), Predicate::True])),
        Predicate::True
    );
    assert_eq!(normalize(&Predicate::Or(vec![])), Predicate::False);
    assert_eq!(normalize(&Predicate::And(vec![])), Predicate::True);
    assert_eq!(normalize(&!!a.clone()), a);
    assert_eq!(normalize(&!Predicate::True), Predicate::False);
}

#[test]
fn normalize_keeps_mixed_junctions_nested() {
    let a = cmp("a", CompareOp::Eq, 1);
    let b = cmp("b", CompareOp::Eq, 2);
    let pred = Predicate::And(vec![Predicate::Or(vec![a.clone(), b.clone()]), a.clone()]);

    assert_eq!(normalize(&pred), pred);
}

// ---------------------------------------------------------------------
// operator semantics
// ---------------------------------------------------------------------

#[test]
fn between_lower_bound_inclusive_upper_exclusive_by_default() {
    let min = Value::Int(1);
    let max = Value::Int(5);

    assert_eq!(eval::between(&Value::Int(1), &min, &max, false), Truth::True);
    assert_eq!(eval::between(&Value::Int(5), &min, &max, false), Truth::False);
    assert_eq!(eval::between(&Value::Int(5), &min, &max, true), Truth::True);
    assert_eq!(eval::between(&Value::Int(0), &min, &max, true), Truth::False);
    assert_eq!(eval::between(&Value::Null, &min, &max, true), Truth::Unknown);
}

#[test]
fn empty_in_set_is_false_even_for_null() {
    assert_eq!(eval::in_set(&Value::Int(1), &[]), Truth::False);
    assert_eq!(eval::in_set(&Value::Null, &[]), Truth::False);
}

#[test]
fn in_set_matches_across_numeric_variants() {
    let items = [Value::Uint(3), Value::float(4.0)];

    assert_eq!(eval::in_set(&Value::Int(3), &items), Truth::True);
    assert_eq!(eval::in_set(&Value::Int(4), &items), Truth::True);
    assert_eq!(eval::in_set(&Value::Int(5), &items), Truth::False);
    assert_eq!(eval::in_set(&Value::Null, &items), Truth::Unknown);
}

#[test]
fn has_flag_requires_all_bits() {
    let flag = Value::Int(0b0110);

    assert_eq!(eval::has_flag(&Value::Int(0b1110), &flag), Truth::True);
    assert_eq!(eval::has_flag(&Value::Int(0b0100), &flag), Truth::False);
    assert_eq!(
        eval::has_flag(&Value::Text("x".to_string()), &flag),
        Truth::Unknown
    );
}

#[test]
fn null_literal_compare_is_a_null_test() {
    assert_eq!(
        eval::compare(CompareOp::Eq, &Value::Null, &Value::Null),
        Truth::True
    );
    assert_eq!(
        eval::compare(CompareOp::Ne, &Value::Int(1), &Value::Null),
        Truth::True
    );
    assert_eq!(
        eval::compare(CompareOp::Lt, &Value::Int(1), &Value::Null),
        Truth::Unknown
    );
    assert_eq!(
        eval::compare(CompareOp::Eq, &Value::Null, &Value::Int(1)),
        Truth::Unknown
    );
}

#[test]
fn incomparable_families_are_unknown() {
    assert_eq!(
        eval::compare(CompareOp::Eq, &Value::Text("1".to_string()), &Value::Int(1)),
        Truth::Unknown
    );
}

#[test]
fn like_wildcards_match_per_character() {
    let pattern = LikePattern::compile("%li%");

    assert!(pattern.matches("Alice"));
    assert!(pattern.matches("li"));
    assert!(!pattern.matches("Bob"));
    assert!(!pattern.matches("ALICE"));

    let one = LikePattern::compile("b_b");
    assert!(one.matches("bob"));
    assert!(one.matches("bäb"));
    assert!(!one.matches("bb"));
    assert!(!one.matches("boob"));
}

#[test]
fn like_backtracks_across_repeated_stars() {
    let pattern = LikePattern::compile("a%b%%c");

    assert!(pattern.matches("axxbyyc"));
    assert!(pattern.matches("abc"));
    assert!(pattern.matches("abbbc"));
    assert!(!pattern.matches("abx"));
    assert!(LikePattern::compile("%").matches(""));
    assert!(!LikePattern::compile("_").matches(""));
}

// ---------------------------------------------------------------------
// build-time validation
// ---------------------------------------------------------------------

#[test]
fn validate_rejects_unknown_static_field() {
    let err = validate::validate(&cmp("nope", CompareOp::Eq, 1), &TestScope).unwrap_err();

    assert_eq!(
        err,
        BuildError::UnknownField {
            path: "nope".to_string(),
            shape: "Test".to_string(),
        }
    );
}

#[test]
fn validate_skips_named_paths() {
    let named = FieldPath::parse("nope").expect("valid path");
    let pred = Predicate::compare(named, CompareOp::Eq, "x");

    assert!(validate::validate(&pred, &TestScope).is_ok());
}

#[test]
fn validate_checks_literal_family_and_custom_operands() {
    assert!(matches!(
        validate::validate(&cmp("id", CompareOp::Gt, "ten"), &TestScope),
        Err(BuildError::LiteralType { .. })
    ));
    assert!(validate::validate(&cmp("score", CompareOp::Gt, 10), &TestScope).is_ok());
    assert!(validate::validate(&cmp("name", CompareOp::Eq, Value::Null), &TestScope).is_ok());

    let like_on_int = Predicate::Custom(CustomPredicate::Like {
        path: FieldPath::new("id"),
        pattern: "%1%".to_string(),
    });
    assert!(matches!(
        validate::validate(&like_on_int, &TestScope),
        Err(BuildError::NonTextPattern { .. })
    ));

    let flag_on_text = Predicate::Custom(CustomPredicate::HasFlag {
        path: FieldPath::new("name"),
        flag: Value::Int(1),
    });
    assert!(matches!(
        validate::validate(&flag_on_text, &TestScope),
        Err(BuildError::NonIntegerFlag { .. })
    ));

    let float_flag = Predicate::Custom(CustomPredicate::HasFlag {
        path: FieldPath::new("flags"),
        flag: Value::float(1.5),
    });
    assert!(matches!(
        validate::validate(&float_flag, &TestScope),
        Err(BuildError::NonIntegerFlag { .. })
    ));
}

#[test]
fn predicate_operators_compose() {
    let a = cmp("a", CompareOp::Eq, 1);
    let b = cmp("b", CompareOp::Eq, 2);

    assert_eq!(
        a.clone() & b.clone(),
        Predicate::And(vec![a.clone(), b.clone()])
    );
    assert_eq!(&a | &b, Predicate::Or(vec![a.clone(), b]));
    assert_eq!(!a.clone(), Predicate::Not(Box::new(a)));
}

#[test]
fn predicate_display_is_readable() {
    let pred = cmp("age", CompareOp::Gte, 18)
        & Predicate::Custom(CustomPredicate::Like {
            path: FieldPath::new("name"),
            pattern: "A%".to_string(),
        });

    assert_eq!(pred.to_string(), "(age >= 18 and name like 'A%')");
}

#[test]
fn flag_literals_coerce_to_integer_kinds_only() {
    let path = FieldPath::new("flags");

    assert_eq!(
        validate::coerce_flag(&path, FieldKind::Int, &Value::Text("6".to_string())),
        Ok(Value::Int(6))
    );
    assert_eq!(
        validate::coerce_flag(&path, FieldKind::Any, &Value::Null),
        Ok(Value::Null)
    );
    for (kind, flag) in [
        (FieldKind::Int, Value::Text("six".to_string())),
        (FieldKind::Int, Value::Float64(Float64::try_new(1.0).unwrap())),
        (FieldKind::Any, Value::Text("6".to_string())),
        (FieldKind::Text, Value::Int(6)),
    ] {
        assert!(matches!(
            validate::coerce_flag(&path, kind, &flag),
            Err(BuildError::NonIntegerFlag { .. })
        ));
    }

    assert!(validate::check_pattern(&path, FieldKind::Any).is_ok());
    assert!(matches!(
        validate::check_pattern(&path, FieldKind::Uint),
        Err(BuildError::NonTextPattern { .. })
    ));
}
