use crate::{
    query::{
        path::FieldPath,
        predicate::{CompareOp, CustomPredicate, Predicate},
    },
    traits::FieldValue,
    value::Value,
};

///
/// FieldRef
///
/// Fluent predicate builder over one field path.
/// `field("age").gte(18)` is the statically bound form; `filter_by` hands
/// a named `FieldRef` to its closure.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FieldRef(FieldPath);

/// Statically bound field reference.
#[must_use]
pub fn field(path: &str) -> FieldRef {
    FieldRef::new(FieldPath::new(path))
}

impl FieldRef {
    #[must_use]
    pub const fn new(path: FieldPath) -> Self {
        Self(path)
    }

    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.0
    }

    // ------------------------------------------------------------------
    // Comparison predicates
    // ------------------------------------------------------------------

    #[must_use]
    pub fn eq(&self, value: impl FieldValue) -> Predicate {
        self.compare(CompareOp::Eq, value.to_value())
    }

    #[must_use]
    pub fn ne(&self, value: impl FieldValue) -> Predicate {
        self.compare(CompareOp::Ne, value.to_value())
    }

    #[must_use]
    pub fn lt(&self, value: impl FieldValue) -> Predicate {
        self.compare(CompareOp::Lt, value.to_value())
    }

    #[must_use]
    pub fn lte(&self, value: impl FieldValue) -> Predicate {
        self.compare(CompareOp::Lte, value.to_value())
    }

    #[must_use]
    pub fn gt(&self, value: impl FieldValue) -> Predicate {
        self.compare(CompareOp::Gt, value.to_value())
    }

    #[must_use]
    pub fn gte(&self, value: impl FieldValue) -> Predicate {
        self.compare(CompareOp::Gte, value.to_value())
    }

    /// `field = null`.
    #[must_use]
    pub fn is_null(&self) -> Predicate {
        self.compare(CompareOp::Eq, Value::Null)
    }

    /// `field <> null`.
    #[must_use]
    pub fn is_not_null(&self) -> Predicate {
        self.compare(CompareOp::Ne, Value::Null)
    }

    fn compare(&self, op: CompareOp, value: Value) -> Predicate {
        Predicate::compare(self.0.clone(), op, value)
    }

    // ------------------------------------------------------------------
    // Custom operators
    // ------------------------------------------------------------------

    /// Half-open range `[min, max)`.
    #[must_use]
    pub fn between(&self, min: impl FieldValue, max: impl FieldValue) -> Predicate {
        self.range(min.to_value(), max.to_value(), false)
    }

    /// Closed range `[min, max]`.
    #[must_use]
    pub fn between_inclusive(&self, min: impl FieldValue, max: impl FieldValue) -> Predicate {
        self.range(min.to_value(), max.to_value(), true)
    }

    fn range(&self, min: Value, max: Value, include_max: bool) -> Predicate {
        Predicate::Custom(CustomPredicate::IsBetween {
            path: self.0.clone(),
            min,
            max,
            include_max,
        })
    }

    /// Membership test against a fixed list.
    #[must_use]
    pub fn is_in<I, V>(&self, items: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        Predicate::Custom(CustomPredicate::IsIn {
            path: self.0.clone(),
            items: items.into_iter().map(|v| v.to_value()).collect(),
        })
    }

    /// All bits of `flag` are set.
    #[must_use]
    pub fn has_flag(&self, flag: impl FieldValue) -> Predicate {
        Predicate::Custom(CustomPredicate::HasFlag {
            path: self.0.clone(),
            flag: flag.to_value(),
        })
    }

    /// Case-sensitive wildcard match (`%`, `_`).
    #[must_use]
    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        Predicate::Custom(CustomPredicate::Like {
            path: self.0.clone(),
            pattern: pattern.into(),
        })
    }
}
