//! ## Crate layout
//! - `core`: values, record shapes, specs, the in-memory engine, the
//!   translation providers and observability.
//! - `error`: the public error type callers match on.
//!
//! The `prelude` module mirrors the surface used by application code.
//! Functions at this level wrap the core entry points and convert their
//! errors into [`Error`].

pub use queryspec_core as core;

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{Error, ErrorKind, ErrorOrigin, QueryErrorKind};

use queryspec_core::{
    config::QueryConfig,
    executor::{Element, apply_query},
    model::Row,
    provider::{QueryProvider, apply_data_query},
    query::QuerySpec,
    traits::{AppliesTo, Record, SpecTarget},
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Entry points
//

/// Run `spec` over `source` and collect every resulting element.
pub fn query<T, S>(
    source: impl IntoIterator<Item = T>,
    spec: &QuerySpec<S>,
) -> Result<Vec<Element<T>>, Error>
where
    T: Record,
    S: AppliesTo<T>,
{
    Ok(apply_query(source, spec)?.elements()?)
}

/// Run `spec` over `source` and flatten the results into dynamic rows.
pub fn query_rows<T, S>(
    source: impl IntoIterator<Item = T>,
    spec: &QuerySpec<S>,
) -> Result<Vec<Row>, Error>
where
    T: Record,
    S: AppliesTo<T>,
{
    Ok(apply_query(source, spec)?.rows()?)
}

/// Translate `spec` into `provider`'s native query, starting from `root`.
pub fn translate<P, S>(provider: &P, root: P::Query, spec: &QuerySpec<S>) -> Result<P::Query, Error>
where
    P: QueryProvider,
    S: SpecTarget,
{
    Ok(apply_data_query(provider, root, spec)?)
}

/// Parse a TOML configuration document.
pub fn load_config(text: &str) -> Result<QueryConfig, Error> {
    Ok(QueryConfig::from_toml_str(text)?)
}

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        Error, query, query_rows, translate,
        core::{
            executor::{Element, Group},
            model::Row,
            provider::{
                QueryProvider as _,
                table::{Table, TableProvider},
            },
            query::{AggregateFunc, Direction, Expr, Predicate, Projection, QuerySpec, field},
            record,
            traits::{FieldValue as _, Record, Untyped},
            value::Value,
        },
    };
    pub use serde::{Deserialize, Serialize};

    #[cfg(feature = "sql")]
    pub use crate::core::provider::sql::{SqlDialect, SqlProvider, SqlTable};
}
