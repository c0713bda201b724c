use crate::{model::FieldKind, value::ValueFamily};
use std::fmt;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Top-level failure for building, parsing, executing or translating a query.
/// Every variant aborts the whole call; nothing is retried.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    PathNotFound(#[from] PathNotFoundError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    TranslationUnsupported(#[from] TranslationUnsupportedError),

    #[error("{0}")]
    Internal(#[from] InternalError),
}

impl QueryError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Build(_) => ErrorClass::InvalidArgument,
            Self::PathNotFound(_) => ErrorClass::NotFound,
            Self::Parse(_) => ErrorClass::Malformed,
            Self::TranslationUnsupported(_) => ErrorClass::Unsupported,
            Self::Internal(err) => err.class,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Build(_) => ErrorOrigin::Builder,
            Self::PathNotFound(err) => err.origin,
            Self::Parse(_) => ErrorOrigin::Parser,
            Self::TranslationUnsupported(_) => ErrorOrigin::Provider,
            Self::Internal(err) => err.origin,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// BuildError
///
/// Invalid combinator arguments. Raised at the builder call for statically
/// bound paths, and at bind time for literals on string-addressed paths.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BuildError {
    #[error("aggregate expressions are only valid in a projection over groups")]
    AggregateOutsideGroup,

    #[error("projection field '{0}' is declared more than once")]
    DuplicateProjectionField(String),

    #[error("projection must declare at least one field")]
    EmptyProjection,

    #[error("sort must declare at least one key")]
    EmptySort,

    #[error("invalid projection field name '{0}'")]
    InvalidProjectionName(String),

    #[error("page and size must be positive (page={page}, size={size})")]
    InvalidPage { page: i64, size: i64 },

    #[error("{family} literal is not comparable with field '{path}' of kind {kind}")]
    LiteralType {
        path: String,
        kind: FieldKind,
        family: ValueFamily,
    },

    #[error("flag test requires an integer field and flag, '{path}' is {kind}")]
    NonIntegerFlag { path: String, kind: FieldKind },

    #[error("pattern match requires a text field and pattern, '{path}' is {kind}")]
    NonTextPattern { path: String, kind: FieldKind },

    #[error("then_by requires a preceding sort")]
    ThenByWithoutSort,

    #[error("unknown field '{path}' on {shape}")]
    UnknownField { path: String, shape: String },
}

///
/// PathNotFoundError
/// A field path that did not resolve against the shape at execution or translation.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("path '{path}' not found on {shape}")]
pub struct PathNotFoundError {
    pub path: String,
    pub shape: String,
    pub origin: ErrorOrigin,
}

impl PathNotFoundError {
    pub(crate) fn executor(path: impl Into<String>, shape: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            shape: shape.into(),
            origin: ErrorOrigin::Executor,
        }
    }

    pub(crate) fn provider(path: impl Into<String>, shape: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            shape: shape.into(),
            origin: ErrorOrigin::Provider,
        }
    }
}

///
/// ParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ParseError {
    #[error("input is empty")]
    EmptyInput,

    #[error("empty sort term at position {position}")]
    EmptyTerm { position: usize },

    #[error("invalid field path '{path}'")]
    InvalidPath { path: String },

    #[error("unexpected token '{token}' in sort term '{term}'")]
    UnexpectedToken { token: String, term: String },

    #[error("unknown sort direction '{token}'")]
    UnknownDirection { token: String },
}

///
/// TranslationUnsupportedError
/// A construct the target provider cannot express natively.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{provider} provider does not support {construct}")]
pub struct TranslationUnsupportedError {
    pub provider: &'static str,
    pub construct: String,
}

impl TranslationUnsupportedError {
    pub fn new(provider: &'static str, construct: impl Into<String>) -> Self {
        Self {
            provider,
            construct: construct.into(),
        }
    }
}

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Raised only when an engine invariant is violated.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an executor-origin invariant violation.
    pub(crate) fn executor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Executor,
            message,
        )
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidArgument,
    Internal,
    InvariantViolation,
    Malformed,
    NotFound,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::Malformed => "malformed",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Builder,
    Config,
    Executor,
    Parser,
    Provider,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Builder => "builder",
            Self::Config => "config",
            Self::Executor => "executor",
            Self::Parser => "parser",
            Self::Provider => "provider",
        };
        write!(f, "{label}")
    }
}
