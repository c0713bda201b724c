//! Record shapes: field kinds, accessor registries and dynamic rows.

pub mod field;
pub mod row;
pub mod shape;

#[cfg(test)]
mod tests;

// re-exports
pub use field::{FieldKind, FieldModel};
pub use row::Row;
pub use shape::{Accessor, OpenResolver, SchemaView, Shape, ShapeBuilder, ShapeField};
