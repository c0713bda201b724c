use crate::{
    model::FieldKind,
    value::{
        Float64, Truth, Value, ValueFamily, coerce_to_kind, sort_cmp, strict_eq, strict_order_cmp,
    },
};
use proptest::prelude::*;
use std::cmp::Ordering;

// ---- helpers -----------------------------------------------------------

fn v_f64(x: f64) -> Value {
    Value::Float64(Float64::try_new(x).expect("finite f64"))
}
fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        (-1.0e9..1.0e9_f64).prop_map(v_f64),
        "[a-z]{0,6}".prop_map(Value::Text),
    ];

    leaf.prop_recursive(2, 8, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::List)
    })
}

// ---- floats ------------------------------------------------------------

#[test]
fn float_rejects_non_finite_and_normalizes_zero() {
    assert!(Float64::try_new(f64::NAN).is_none());
    assert!(Float64::try_new(f64::INFINITY).is_none());
    assert_eq!(Float64::try_new(-0.0), Float64::try_new(0.0));
    assert_eq!(Value::float(f64::NEG_INFINITY), Value::Null);
}

// ---- strict comparisons ------------------------------------------------

#[test]
fn numeric_variants_compare_by_value() {
    assert_eq!(strict_eq(&Value::Int(3), &Value::Uint(3)), Some(true));
    assert_eq!(strict_eq(&Value::Int(3), &v_f64(3.0)), Some(true));
    assert_eq!(
        strict_order_cmp(&Value::Int(-1), &Value::Uint(u64::MAX)),
        Some(Ordering::Less)
    );
    assert_eq!(
        strict_order_cmp(&v_f64(2.5), &Value::Int(2)),
        Some(Ordering::Greater)
    );
}

#[test]
fn mismatched_families_and_nulls_are_incomparable() {
    assert_eq!(strict_order_cmp(&Value::Int(1), &v_txt("1")), None);
    assert_eq!(strict_eq(&Value::Bool(true), &Value::Int(1)), None);
    assert_eq!(strict_eq(&Value::Null, &Value::Null), None);
    assert_eq!(strict_order_cmp(&Value::Null, &Value::Int(0)), None);
}

#[test]
fn text_compares_ordinally() {
    assert_eq!(
        strict_order_cmp(&v_txt("Zed"), &v_txt("alice")),
        Some(Ordering::Less)
    );
    assert_eq!(strict_eq(&v_txt("a"), &v_txt("A")), Some(false));
}

// ---- sort order --------------------------------------------------------

#[test]
fn sort_cmp_places_null_first_then_families() {
    let mut values = vec![
        Value::from_list([1]),
        v_txt("b"),
        Value::Int(2),
        Value::Null,
        Value::Bool(false),
        v_f64(1.5),
    ];
    values.sort_by(sort_cmp);

    assert_eq!(
        values,
        vec![
            Value::Null,
            Value::Bool(false),
            v_f64(1.5),
            Value::Int(2),
            v_txt("b"),
            Value::from_list([1]),
        ]
    );
}

#[test]
fn sort_cmp_orders_lists_lexicographically() {
    let short = Value::from_list([1, 2]);
    let long = Value::from_list([1, 2, 0]);

    assert_eq!(sort_cmp(&short, &long), Ordering::Less);
    assert_eq!(
        sort_cmp(&Value::from_list([2]), &long),
        Ordering::Greater
    );
}

proptest! {
    #[test]
    fn sort_cmp_is_antisymmetric(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(sort_cmp(&a, &b), sort_cmp(&b, &a).reverse());
    }

    #[test]
    fn sort_cmp_is_reflexive(a in arb_value()) {
        prop_assert_eq!(sort_cmp(&a, &a), Ordering::Equal);
    }

    #[test]
    fn strict_order_agrees_with_sort_order(a in arb_value(), b in arb_value()) {
        if let Some(ord) = strict_order_cmp(&a, &b) {
            prop_assert_eq!(ord, sort_cmp(&a, &b));
        }
    }
}

// ---- truth -------------------------------------------------------------

#[test]
fn truth_follows_kleene_tables() {
    use Truth::{False, True, Unknown};

    assert_eq!(Unknown.and(False), False);
    assert_eq!(Unknown.and(True), Unknown);
    assert_eq!(Unknown.or(True), True);
    assert_eq!(Unknown.or(False), Unknown);
    assert_eq!(!Unknown, Unknown);
    assert_eq!(Truth::from_option(None), Unknown);
}

// ---- coercion ----------------------------------------------------------

#[test]
fn coerce_parses_text_into_declared_kind() {
    assert_eq!(coerce_to_kind(FieldKind::Int, &v_txt(" 42 ")), Some(Value::Int(42)));
    assert_eq!(coerce_to_kind(FieldKind::Uint, &v_txt("7")), Some(Value::Uint(7)));
    assert_eq!(coerce_to_kind(FieldKind::Bool, &v_txt("TRUE")), Some(Value::Bool(true)));
    assert_eq!(coerce_to_kind(FieldKind::Float, &v_txt("0.5")), Some(v_f64(0.5)));
    assert_eq!(coerce_to_kind(FieldKind::Float, &v_txt("NaN")), None);
}

#[test]
fn coerce_keeps_nulls_numbers_and_any() {
    assert_eq!(coerce_to_kind(FieldKind::Text, &Value::Null), Some(Value::Null));
    assert_eq!(coerce_to_kind(FieldKind::Float, &Value::Int(1)), Some(Value::Int(1)));
    assert_eq!(coerce_to_kind(FieldKind::Any, &v_txt("x")), Some(v_txt("x")));
    assert_eq!(coerce_to_kind(FieldKind::Int, &v_txt("x")), None);
    assert_eq!(coerce_to_kind(FieldKind::Text, &Value::Int(1)), None);
}

// ---- conversions -------------------------------------------------------

#[test]
fn conversions_pick_expected_variants() {
    assert_eq!(Value::from(3_u8), Value::Uint(3));
    assert_eq!(Value::from(-3_i32), Value::Int(-3));
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(vec!["a", "b"]).family(), ValueFamily::List);
    assert_eq!(Value::from(Some("x")).to_string(), "'x'");
    assert_eq!(Value::from_list([1, 2]).to_string(), "[1, 2]");
}
