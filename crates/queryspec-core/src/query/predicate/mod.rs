mod ast;
pub(crate) mod eval;
mod like;
mod normalize;
pub(crate) mod validate;

#[cfg(test)]
mod tests;

pub use ast::{CompareOp, ComparePredicate, CustomPredicate, Predicate};
pub use like::LikePattern;
pub use normalize::normalize;
pub use validate::FieldScope;
