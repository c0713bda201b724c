use crate::{error::BuildError, query::path::FieldPath, value::Value};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// AggregateFunc
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AggregateFunc {
    Count,
    Max,
    Min,
    Sum,
}

impl AggregateFunc {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
        }
    }
}

///
/// Expr
///
/// Value expression used by projections and group keys.
/// Aggregates range over the items of a group and are only legal in a
/// projection that directly consumes grouped elements.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Expr {
    Aggregate {
        func: AggregateFunc,
        field: Option<FieldPath>,
    },
    Field(FieldPath),
    Literal(Value),
}

impl Expr {
    #[must_use]
    pub fn field(path: impl Into<FieldPath>) -> Self {
        Self::Field(path.into())
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Number of items in the group.
    #[must_use]
    pub const fn count() -> Self {
        Self::Aggregate {
            func: AggregateFunc::Count,
            field: None,
        }
    }

    /// Number of items whose field is not null.
    #[must_use]
    pub fn count_of(path: impl Into<FieldPath>) -> Self {
        Self::aggregate(AggregateFunc::Count, path)
    }

    #[must_use]
    pub fn sum(path: impl Into<FieldPath>) -> Self {
        Self::aggregate(AggregateFunc::Sum, path)
    }

    #[must_use]
    pub fn min(path: impl Into<FieldPath>) -> Self {
        Self::aggregate(AggregateFunc::Min, path)
    }

    #[must_use]
    pub fn max(path: impl Into<FieldPath>) -> Self {
        Self::aggregate(AggregateFunc::Max, path)
    }

    fn aggregate(func: AggregateFunc, path: impl Into<FieldPath>) -> Self {
        Self::Aggregate {
            func,
            field: Some(path.into()),
        }
    }

    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate { .. })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate { func, field } => match field {
                Some(path) => write!(f, "{}({path})", func.name()),
                None => write!(f, "{}(*)", func.name()),
            },
            Self::Field(path) => write!(f, "{path}"),
            Self::Literal(value) => write!(f, "{value}"),
        }
    }
}

///
/// Projection
///
/// Ordered, uniquely named output fields. Names follow path segment rules
/// and may be dotted, so projected rows can be addressed like nested records.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Projection {
    fields: Vec<(String, Expr)>,
}

impl Projection {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Project a field under its own dotted name.
    #[must_use]
    pub fn field(self, path: &str) -> Self {
        self.with(path, Expr::field(path))
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, expr: Expr) -> Self {
        self.fields.push((name.into(), expr));
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, Expr)] {
        &self.fields
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Structural checks independent of any shape.
    pub(crate) fn check(&self) -> Result<(), BuildError> {
        if self.fields.is_empty() {
            return Err(BuildError::EmptyProjection);
        }

        for (i, (name, _)) in self.fields.iter().enumerate() {
            if FieldPath::parse(name).is_err() || name.trim() != name {
                return Err(BuildError::InvalidProjectionName(name.clone()));
            }
            if self.fields[..i].iter().any(|(prev, _)| prev == name) {
                return Err(BuildError::DuplicateProjectionField(name.clone()));
            }
        }

        Ok(())
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Into<String>> FromIterator<(N, Expr)> for Projection {
    fn from_iter<I: IntoIterator<Item = (N, Expr)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(n, e)| (n.into(), e)).collect(),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, expr)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{expr} as {name}")?;
        }
        Ok(())
    }
}
