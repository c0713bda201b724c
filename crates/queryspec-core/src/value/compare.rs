use crate::value::Value;
use std::{cmp::Ordering, ops::Not};

///
/// Truth
///
/// Three-valued predicate outcome. `Unknown` arises from null operands and
/// incomparable value families; filters keep an element only on `True`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    #[must_use]
    pub const fn from_bool(b: bool) -> Self {
        if b { Self::True } else { Self::False }
    }

    /// Lift an optional comparison result; `None` means the comparison was undefined.
    #[must_use]
    pub const fn from_option(b: Option<bool>) -> Self {
        match b {
            Some(b) => Self::from_bool(b),
            None => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    /// Kleene conjunction.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    /// Kleene disjunction.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }
}

impl Not for Truth {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }
}

/// Strict comparator for orderable values.
///
/// Numeric variants compare with each other by value; every other family
/// only compares with itself. Returns `None` for null operands and for
/// mismatched families.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (Value::List(a), Value::List(b)) => strict_order_list(a, b),
        (l, r) if l.is_numeric() && r.is_numeric() => numeric_cmp(l, r),
        _ => None,
    }
}

/// Strict equality under the same family rules as `strict_order_cmp`.
#[must_use]
pub fn strict_eq(left: &Value, right: &Value) -> Option<bool> {
    strict_order_cmp(left, right).map(Ordering::is_eq)
}

/// Total order used by sorting, grouping and aggregate extrema.
///
/// Ordering rules:
/// 1. `Null` sorts before everything else
/// 2. Family rank: bool, numeric, text, list
/// 3. Family-specific comparison within the same rank
#[must_use]
pub fn sort_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = family_rank(left).cmp(&family_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            for (a, b) in a.iter().zip(b.iter()) {
                let cmp = sort_cmp(a, b);
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }

            a.len().cmp(&b.len())
        }
        _ => strict_order_cmp(left, right).unwrap_or(Ordering::Equal),
    }
}

const fn family_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Float64(_) | Value::Int(_) | Value::Uint(_) => 2,
        Value::Text(_) => 3,
        Value::List(_) => 4,
    }
}

// Integers compare exactly; any float operand switches to f64 comparison.
fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (left.as_i128(), right.as_i128()) {
        return Some(a.cmp(&b));
    }

    let (a, b) = (left.as_f64()?, right.as_f64()?);
    a.partial_cmp(&b)
}

fn strict_order_list(left: &[Value], right: &[Value]) -> Option<Ordering> {
    for (a, b) in left.iter().zip(right.iter()) {
        let cmp = strict_order_cmp(a, b)?;
        if cmp != Ordering::Equal {
            return Some(cmp);
        }
    }

    Some(left.len().cmp(&right.len()))
}
