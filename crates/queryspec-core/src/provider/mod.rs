//! Remote translation: turn a spec into a provider-native query.
//!
//! A provider exposes expression and query primitives; `apply_data_query`
//! walks the operations in append order and composes them. Anything a
//! provider cannot express natively fails the whole translation.

#[cfg(feature = "sql")]
pub mod sql;
pub mod table;
mod translate;


use crate::{
    error::{QueryError, TranslationUnsupportedError},
    model::FieldKind,
    query::{AggregateFunc, CompareOp, Direction, FieldPath},
    value::Value,
};

// re-exports
pub use translate::apply_data_query;

///
/// Member
/// A bound field reference plus the kind literals are coerced to.
///

#[derive(Clone, Debug)]
pub struct Member<E> {
    pub expr: E,
    pub kind: FieldKind,
}

impl<E> Member<E> {
    pub const fn new(expr: E, kind: FieldKind) -> Self {
        Self { expr, kind }
    }
}

///
/// Column
/// One named output of a projection or grouping.
///

#[derive(Clone, Debug)]
pub struct Column<E> {
    pub name: String,
    pub expr: E,
    pub kind: FieldKind,
}

///
/// QueryProvider
///
/// Native primitives a remote store offers. Optional primitives default to
/// `TranslationUnsupportedError` so a provider only implements what it can
/// evaluate itself.
///

pub trait QueryProvider {
    type Query;
    type Expr: Clone;

    /// Short provider label used in errors, logs and metrics.
    fn name(&self) -> &'static str;

    fn unsupported(&self, construct: &str) -> QueryError {
        TranslationUnsupportedError::new(self.name(), construct).into()
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Resolve a path against the current output of `query`.
    fn member(&self, query: &Self::Query, path: &FieldPath) -> Result<Member<Self::Expr>, QueryError>;

    /// Resolve a path against the members of the groups `query` produces.
    fn group_member(
        &self,
        query: &Self::Query,
        path: &FieldPath,
    ) -> Result<Member<Self::Expr>, QueryError> {
        let _ = (query, path);
        Err(self.unsupported("grouped member access"))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn literal(&self, value: Value) -> Result<Self::Expr, QueryError>;

    fn constant(&self, value: bool) -> Result<Self::Expr, QueryError>;

    /// Native comparison; a null operand on either side is unknown.
    fn compare(
        &self,
        op: CompareOp,
        left: Self::Expr,
        right: Self::Expr,
    ) -> Result<Self::Expr, QueryError>;

    fn is_null(&self, expr: Self::Expr, negated: bool) -> Result<Self::Expr, QueryError>;

    fn and(&self, children: Vec<Self::Expr>) -> Result<Self::Expr, QueryError>;

    fn or(&self, children: Vec<Self::Expr>) -> Result<Self::Expr, QueryError>;

    fn not(&self, inner: Self::Expr) -> Result<Self::Expr, QueryError>;

    /// `%` / `_` pattern match, case-sensitive, no escape character.
    fn like(&self, expr: Self::Expr, pattern: &str) -> Result<Self::Expr, QueryError> {
        let _ = (expr, pattern);
        Err(self.unsupported("pattern match"))
    }

    /// Membership over a non-empty set of non-null items.
    fn in_set(&self, expr: Self::Expr, items: Vec<Self::Expr>) -> Result<Self::Expr, QueryError> {
        let _ = (expr, items);
        Err(self.unsupported("set membership"))
    }

    fn bit_and(&self, left: Self::Expr, right: Self::Expr) -> Result<Self::Expr, QueryError> {
        let _ = (left, right);
        Err(self.unsupported("bitwise and"))
    }

    fn aggregate(
        &self,
        func: AggregateFunc,
        arg: Option<Self::Expr>,
    ) -> Result<Self::Expr, QueryError> {
        let _ = arg;
        Err(self.unsupported(&format!("aggregate {}", func.name())))
    }

    // ------------------------------------------------------------------
    // Query composition
    // ------------------------------------------------------------------

    fn filter(&self, query: Self::Query, predicate: Self::Expr) -> Result<Self::Query, QueryError>;

    /// Stable re-ordering: the new keys take precedence over any earlier order.
    fn order_by(
        &self,
        query: Self::Query,
        keys: Vec<(Self::Expr, Direction)>,
    ) -> Result<Self::Query, QueryError>;

    fn skip(&self, query: Self::Query, count: u64) -> Result<Self::Query, QueryError>;

    fn take(&self, query: Self::Query, count: u64) -> Result<Self::Query, QueryError>;

    fn project(
        &self,
        query: Self::Query,
        columns: Vec<Column<Self::Expr>>,
    ) -> Result<Self::Query, QueryError> {
        let _ = (query, columns);
        Err(self.unsupported("projection"))
    }

    /// Group by `key`; groups expose `key` and `count` and come out in
    /// ascending key order, nulls first.
    fn group_by(
        &self,
        query: Self::Query,
        key: Self::Expr,
        kind: FieldKind,
    ) -> Result<Self::Query, QueryError> {
        let _ = (query, key, kind);
        Err(self.unsupported("grouping"))
    }
}
