//! Core runtime for queryspec: values, record shapes, query specifications,
//! the in-memory engine, the remote translation providers and observability.
#![warn(unreachable_pub)]

mod macros;

// public exports are one module level down
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod obs;
pub mod provider;
pub mod query;
pub mod traits;
pub mod value;

///
/// Prelude
///
/// Prelude contains the vocabulary needed to declare records and build,
/// run and translate specs. Errors and provider internals stay one level down.
///

pub mod prelude {
    pub use crate::{
        executor::{Element, Group, apply_query},
        model::Row,
        provider::{QueryProvider, apply_data_query},
        query::{AggregateFunc, Direction, Expr, Predicate, QuerySpec, field},
        record,
        traits::{FieldValue as _, Record, Untyped},
        value::Value,
    };
}
