use super::*;
use crate::{record, traits::Record, value::Value};

#[derive(Clone, Debug)]
struct Address {
    city: String,
    zip: Option<u32>,
}

record!(Address { city, zip });

#[derive(Clone, Debug)]
struct Person {
    id: u64,
    name: String,
    score: Option<f64>,
    address: Address,
}

record!(Person { id, name, score } nested { address });

fn sample() -> Person {
    Person {
        id: 7,
        name: "Ana".to_string(),
        score: None,
        address: Address {
            city: "Lisbon".to_string(),
            zip: Some(1100),
        },
    }
}

#[test]
fn record_macro_registers_declared_fields_with_kinds() {
    let shape = Person::shape();

    assert_eq!(shape.name(), "Person");
    assert_eq!(shape.field_kind("id"), Some(FieldKind::Uint));
    assert_eq!(shape.field_kind("name"), Some(FieldKind::Text));
    assert_eq!(shape.field_kind("score"), Some(FieldKind::Float));
    assert_eq!(shape.field_kind("missing"), None);
    assert!(!shape.is_open());
}

#[test]
fn nested_records_flatten_into_dotted_paths() {
    let shape = Person::shape();
    let person = sample();

    assert_eq!(shape.field_kind("address.city"), Some(FieldKind::Text));
    assert_eq!(
        shape.read(&person, "address.city"),
        Some(Value::Text("Lisbon".to_string()))
    );
    assert_eq!(shape.read(&person, "address.zip"), Some(Value::Uint(1100)));
}

#[test]
fn optional_fields_read_as_null() {
    let person = sample();

    assert_eq!(Person::shape().read(&person, "score"), Some(Value::Null));
}

#[test]
fn shape_is_cached_per_type() {
    assert!(std::ptr::eq(Person::shape(), Person::shape()));
}

#[test]
fn computed_fields_and_later_registration_wins() {
    let shape = Shape::<Person>::builder("Person")
        .field("name", |p: &Person| &p.name)
        .computed("name", FieldKind::Int, |p| Value::from(p.name.len() as u64))
        .build();

    assert_eq!(shape.fields().len(), 1);
    assert_eq!(shape.field_kind("name"), Some(FieldKind::Int));
    assert_eq!(shape.read(&sample(), "name"), Some(Value::Uint(3)));
}

#[test]
fn row_shape_is_open_and_resolves_per_row() {
    let row = Row::new().with("a", 1_i64).with("b.c", "x");
    let shape = Row::shape();

    assert!(shape.is_open());
    assert_eq!(shape.field_kind("anything"), Some(FieldKind::Any));
    assert_eq!(shape.read(&row, "b.c"), Some(Value::Text("x".to_string())));
    assert_eq!(shape.read(&row, "zzz"), None);
}

#[test]
fn row_set_replaces_in_place() {
    let row = Row::new().with("a", 1_i64).with("b", 2_i64).with("a", 3_i64);

    assert_eq!(row.len(), 2);
    assert_eq!(row.value_at(0), Some(&Value::Int(3)));
    assert_eq!(row.to_string(), "{a: 3, b: 2}");
}

#[cfg(feature = "json")]
#[test]
fn row_from_json_flattens_objects() {
    let json = serde_json::json!({
        "id": 3,
        "tags": ["a", "b"],
        "owner": { "name": "Bo", "age": null }
    });
    let row = Row::from_json(&json).expect("object input");

    assert_eq!(row.get("id"), Some(&Value::Int(3)));
    assert_eq!(row.get("owner.name"), Some(&Value::Text("Bo".to_string())));
    assert_eq!(row.get("owner.age"), Some(&Value::Null));
    assert_eq!(
        row.get("tags"),
        Some(&Value::from_list(["a", "b"]))
    );
}
