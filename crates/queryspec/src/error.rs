use derive_more::Display;
use queryspec_core::{
    config::ConfigError,
    error::{ErrorOrigin as CoreErrorOrigin, InternalError, QueryError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(ErrorKind::Internal, err.origin.into(), err.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        let kind = match &err {
            QueryError::Build(_) => ErrorKind::Query(QueryErrorKind::Invalid),
            QueryError::PathNotFound(_) => ErrorKind::Query(QueryErrorKind::PathNotFound),
            QueryError::Parse(_) => ErrorKind::Query(QueryErrorKind::Malformed),
            QueryError::TranslationUnsupported(_) => ErrorKind::Query(QueryErrorKind::Unsupported),
            QueryError::Internal(_) => ErrorKind::Internal,
        };

        Self::new(kind, err.origin().into(), err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, err.origin().into(), err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),

    /// Configuration text could not be loaded.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// QueryErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Builder arguments are invalid (bad literals, empty projections).
    Invalid,

    /// A textual sort specification could not be parsed.
    Malformed,

    /// A field path did not resolve at execution or translation.
    PathNotFound,

    /// The target provider cannot express part of the spec.
    Unsupported,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Builder,
    Config,
    Executor,
    Parser,
    Provider,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Builder => Self::Builder,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Executor => Self::Executor,
            CoreErrorOrigin::Parser => Self::Parser,
            CoreErrorOrigin::Provider => Self::Provider,
        }
    }
}
