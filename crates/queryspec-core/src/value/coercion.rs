use crate::{
    model::field::FieldKind,
    value::{Float64, Value},
};

/// Coerce a literal toward the declared kind of the field it is compared with.
///
/// Used for string-addressed paths, whose literals are only checked once the
/// concrete shape is known. Numeric variants pass through unchanged because
/// comparisons widen across them; text literals parse into the target kind.
/// Returns `None` when the literal cannot represent a value of that kind.
#[must_use]
pub fn coerce_to_kind(kind: FieldKind, value: &Value) -> Option<Value> {
    match (kind, value) {
        (_, Value::Null) | (FieldKind::Any, _) => Some(value.clone()),

        (FieldKind::Bool, Value::Bool(_))
        | (FieldKind::Text, Value::Text(_))
        | (FieldKind::List, Value::List(_)) => Some(value.clone()),

        (FieldKind::Int | FieldKind::Uint | FieldKind::Float, v) if v.is_numeric() => {
            Some(value.clone())
        }

        (FieldKind::Bool, Value::Text(s)) => parse_bool(s).map(Value::Bool),
        (FieldKind::Int, Value::Text(s)) => s.trim().parse::<i64>().ok().map(Value::Int),
        (FieldKind::Uint, Value::Text(s)) => s.trim().parse::<u64>().ok().map(Value::Uint),
        (FieldKind::Float, Value::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Float64::try_new)
            .map(Value::Float64),

        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
