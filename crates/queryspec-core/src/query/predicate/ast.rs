use crate::{query::path::FieldPath, value::Value};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    ops::{BitAnd, BitOr, Not},
};

///
/// Predicate AST
///
/// Pure, shape-agnostic representation of query predicates.
/// Interpretation happens in later passes:
///
/// - normalization
/// - validation (statically bound paths on typed specs)
/// - binding (execution) or translation (providers)
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0x01,
    Ne = 0x02,
    Lt = 0x03,
    Lte = 0x04,
    Gt = 0x05,
    Gte = 0x06,
}

impl CompareOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Whether an ordering between two comparable operands satisfies this op.
    #[must_use]
    pub const fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Ne => !matches!(ordering, Ordering::Equal),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Lte => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Gte => !matches!(ordering, Ordering::Less),
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComparePredicate {
    pub path: FieldPath,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    #[must_use]
    pub const fn new(path: FieldPath, op: CompareOp, value: Value) -> Self {
        Self { path, op, value }
    }
}

///
/// CustomPredicate
///
/// Operators beyond plain comparison. Each has a native mapping in the
/// translation layer; providers that lack one reject the spec.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CustomPredicate {
    /// `min <= v && (v < max || include_max && v <= max)`.
    IsBetween {
        path: FieldPath,
        min: Value,
        max: Value,
        include_max: bool,
    },

    /// `(v & flag) == flag` on integer values.
    HasFlag { path: FieldPath, flag: Value },

    /// Equality against any item; an empty item set never matches.
    IsIn { path: FieldPath, items: Vec<Value> },

    /// `%` matches any run of characters, `_` exactly one; no escape.
    Like { path: FieldPath, pattern: String },
}

impl CustomPredicate {
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        match self {
            Self::IsBetween { path, .. }
            | Self::HasFlag { path, .. }
            | Self::IsIn { path, .. }
            | Self::Like { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IsBetween { .. } => "IsBetween",
            Self::HasFlag { .. } => "HasFlag",
            Self::IsIn { .. } => "IsIn",
            Self::Like { .. } => "Like",
        }
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    Custom(CustomPredicate),
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn compare(path: impl Into<FieldPath>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(path.into(), op, value.into()))
    }

    /// Visit every field path referenced by this predicate, depth first.
    pub fn for_each_path(&self, f: &mut impl FnMut(&FieldPath)) {
        match self {
            Self::True | Self::False => {}
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.for_each_path(f);
                }
            }
            Self::Not(inner) => inner.for_each_path(f),
            Self::Compare(cmp) => f(&cmp.path),
            Self::Custom(custom) => f(custom.path()),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self.clone(), rhs.clone()])
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::And(children) => join(f, children, " and "),
            Self::Or(children) => join(f, children, " or "),
            Self::Not(inner) => write!(f, "not {inner}"),
            Self::Compare(cmp) => write!(f, "{} {} {}", cmp.path, cmp.op.symbol(), cmp.value),
            Self::Custom(CustomPredicate::IsBetween {
                path,
                min,
                max,
                include_max,
            }) => {
                let close = if *include_max { ']' } else { ')' };
                write!(f, "{path} between [{min}, {max}{close}")
            }
            Self::Custom(CustomPredicate::HasFlag { path, flag }) => {
                write!(f, "{path} has flag {flag}")
            }
            Self::Custom(CustomPredicate::IsIn { path, items }) => {
                write!(f, "{path} in {}", Value::List(items.clone()))
            }
            Self::Custom(CustomPredicate::Like { path, pattern }) => {
                write!(f, "{path} like '{pattern}'")
            }
        }
    }
}
