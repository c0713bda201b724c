use crate::{
    query::predicate::{CompareOp, LikePattern},
    value::{Truth, Value, strict_order_cmp},
};

// Operator semantics shared by the in-memory engine and the table provider.
// Null operands and incomparable families yield `Unknown`.

/// Compare a field value against a literal.
///
/// A `Null` literal turns `Eq` / `Ne` into null tests; other operators
/// against `Null` are unknown.
#[must_use]
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Truth {
    if right.is_null() {
        return match op {
            CompareOp::Eq => Truth::from_bool(left.is_null()),
            CompareOp::Ne => Truth::from_bool(!left.is_null()),
            _ => Truth::Unknown,
        };
    }

    Truth::from_option(strict_order_cmp(left, right).map(|ord| op.matches(ord)))
}

/// Lower bound inclusive; upper bound inclusive only when requested.
#[must_use]
pub fn between(value: &Value, min: &Value, max: &Value, include_max: bool) -> Truth {
    let upper = if include_max {
        CompareOp::Lte
    } else {
        CompareOp::Lt
    };

    compare(CompareOp::Gte, value, min).and(compare(upper, value, max))
}

/// Membership; an empty set is false for every value, null included.
#[must_use]
pub fn in_set(value: &Value, items: &[Value]) -> Truth {
    items.iter().fold(Truth::False, |acc, item| {
        acc.or(compare(CompareOp::Eq, value, item))
    })
}

/// Bitwise AND of two integer values; `Null` for any other operand.
#[must_use]
pub fn bit_and(left: &Value, right: &Value) -> Value {
    match (left.as_i128(), right.as_i128()) {
        (Some(a), Some(b)) => {
            let bits = a & b;
            i64::try_from(bits)
                .map(Value::Int)
                .or_else(|_| u64::try_from(bits).map(Value::Uint))
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// `(value & flag) == flag`.
#[must_use]
pub fn has_flag(value: &Value, flag: &Value) -> Truth {
    if flag.is_null() {
        return Truth::Unknown;
    }

    compare(CompareOp::Eq, &bit_and(value, flag), flag)
}

#[must_use]
pub fn like(value: &Value, pattern: &LikePattern) -> Truth {
    match value {
        Value::Text(text) => Truth::from_bool(pattern.matches(text)),
        _ => Truth::Unknown,
    }
}
