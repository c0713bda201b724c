use crate::value::{Value, ValueFamily};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// FieldKind
///
/// Minimal type surface needed by literal validation and coercion.
/// Aligned with `Value` families; this is a lossy projection of Rust types.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum FieldKind {
    Bool,
    Float,
    Int,
    List,
    Text,
    Uint,

    /// Kind is not known statically (open shapes, literal projections).
    Any,
}

impl FieldKind {
    /// Value family this kind stores, `None` for `Any`.
    #[must_use]
    pub const fn family(self) -> Option<ValueFamily> {
        match self {
            Self::Bool => Some(ValueFamily::Bool),
            Self::Float | Self::Int | Self::Uint => Some(ValueFamily::Numeric),
            Self::List => Some(ValueFamily::List),
            Self::Text => Some(ValueFamily::Textual),
            Self::Any => None,
        }
    }

    /// True if a literal of the given family may be compared against this kind.
    /// Null literals are accepted everywhere (fields are nullable).
    #[must_use]
    pub fn accepts(self, family: ValueFamily) -> bool {
        if family == ValueFamily::Null {
            return true;
        }

        self.family().is_none_or(|own| own == family)
    }

    /// True if bitwise flag tests are defined for this kind.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Any)
    }

    /// True if pattern matching is defined for this kind.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Any)
    }

    /// Best-effort kind of a runtime value (used for projected literals).
    #[must_use]
    pub const fn of_value(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Bool,
            Value::Float64(_) => Self::Float,
            Value::Int(_) => Self::Int,
            Value::List(_) => Self::List,
            Value::Text(_) => Self::Text,
            Value::Uint(_) => Self::Uint,
            Value::Null => Self::Any,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Int => "int",
            Self::List => "list",
            Self::Text => "text",
            Self::Uint => "uint",
            Self::Any => "any",
        };

        f.write_str(label)
    }
}

///
/// FieldModel
/// Runtime field metadata exposed by a shape for validation and providers.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Dotted field path as used in predicates and sort terms.
    pub path: String,
    pub kind: FieldKind,
}
