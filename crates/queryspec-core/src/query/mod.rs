//! Query specification: operations, predicates, paths and the builder.

pub mod builder;
pub mod explain;
pub mod expr;
mod fingerprint;
pub mod metadata;
pub mod operation;
pub mod parse;
pub mod path;
pub mod predicate;
pub mod sort;
pub mod spec;


pub use builder::{FieldRef, field};
pub use explain::ExplainSpec;
pub use expr::{AggregateFunc, Expr, Projection};
pub use metadata::{INCLUDE_KEY, MetadataBag, MetadataValue};
pub use operation::{CountAccessor, Operation, SkipCount};
pub use parse::{SortParseMode, parse_sort};
pub use path::{FieldPath, PathBinding};
pub use predicate::{CompareOp, ComparePredicate, CustomPredicate, Predicate};
pub use sort::{Direction, SortKey};
pub use spec::QuerySpec;
