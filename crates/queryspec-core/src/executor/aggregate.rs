use crate::{
    query::expr::AggregateFunc,
    value::{Value, sort_cmp},
};

// Aggregate folds shared by the in-memory engine and the table provider.
// Nulls are skipped; an aggregate over no non-null values is `Null`
// (except `count`, which is zero).

pub(crate) fn fold(func: AggregateFunc, values: impl IntoIterator<Item = Value>) -> Value {
    let values = values.into_iter().filter(|v| !v.is_null());

    match func {
        AggregateFunc::Count => Value::Int(i64::try_from(values.count()).unwrap_or(i64::MAX)),
        AggregateFunc::Max => values.max_by(sort_cmp).unwrap_or(Value::Null),
        AggregateFunc::Min => values.min_by(sort_cmp).unwrap_or(Value::Null),
        AggregateFunc::Sum => sum(values),
    }
}

/// Exact integer sum when every operand is an integer, float sum otherwise.
/// Any non-numeric operand makes the sum `Null`.
fn sum(values: impl Iterator<Item = Value>) -> Value {
    let mut int_total: Option<i128> = Some(0);
    let mut float_total = 0.0_f64;
    let mut seen = false;

    for value in values {
        if !value.is_numeric() {
            return Value::Null;
        }
        seen = true;

        int_total = match (int_total, value.as_i128()) {
            (Some(acc), Some(i)) => acc.checked_add(i),
            _ => None,
        };
        float_total += value.as_f64().unwrap_or(0.0);
    }

    if !seen {
        return Value::Null;
    }

    match int_total {
        Some(total) => i64::try_from(total)
            .map(Value::Int)
            .or_else(|_| u64::try_from(total).map(Value::Uint))
            .unwrap_or_else(|_| Value::float(float_total)),
        None => Value::float(float_total),
    }
}
