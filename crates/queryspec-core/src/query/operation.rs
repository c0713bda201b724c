use crate::query::{
    expr::{Expr, Projection},
    predicate::Predicate,
    sort::SortKey,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, sync::Arc};

///
/// CountAccessor
/// Deferred row count, evaluated each time the spec is executed or translated.
///

#[derive(Clone)]
pub struct CountAccessor(Arc<dyn Fn() -> i64 + Send + Sync>);

impl CountAccessor {
    pub fn new(f: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn get(&self) -> i64 {
        (self.0)()
    }
}

impl fmt::Debug for CountAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CountAccessor(..)")
    }
}

impl PartialEq for CountAccessor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

///
/// SkipCount
///

#[derive(Clone, Debug, PartialEq)]
pub enum SkipCount {
    Deferred(CountAccessor),
    Fixed(i64),
}

impl SkipCount {
    /// Evaluate the count, clamping negatives to zero.
    #[must_use]
    pub fn resolve(&self) -> u64 {
        let raw = match self {
            Self::Deferred(accessor) => accessor.get(),
            Self::Fixed(n) => *n,
        };

        u64::try_from(raw).unwrap_or(0)
    }
}

impl Serialize for SkipCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            Self::Deferred(accessor) => accessor.get(),
            Self::Fixed(n) => *n,
        };

        serializer.serialize_i64(raw)
    }
}

impl<'de> Deserialize<'de> for SkipCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::Fixed)
    }
}

/// Clamp a take count to zero and widen it.
#[must_use]
pub(crate) fn clamp_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

///
/// Operation
///
/// One step of a spec, in logical application order.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Operation {
    Filter(Predicate),
    GroupBy(Expr),
    Project(Projection),
    Skip(SkipCount),
    Sort(Vec<SortKey>),
    Take(i64),
}

impl Operation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::GroupBy(_) => "group_by",
            Self::Project(_) => "project",
            Self::Skip(_) => "skip",
            Self::Sort(_) => "sort",
            Self::Take(_) => "take",
        }
    }
}
