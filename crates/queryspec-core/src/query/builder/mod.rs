//! Fluent predicate construction.

mod field;

pub use field::{FieldRef, field};
