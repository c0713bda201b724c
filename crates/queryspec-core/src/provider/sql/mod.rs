//! SQL provider: renders a spec as one `SELECT` with positional parameters.

mod dialect;
mod expr;
mod query;
mod render;


use crate::{
    config::SqlConfig,
    error::{BuildError, PathNotFoundError, QueryError},
    model::FieldKind,
    provider::{Column, Member, QueryProvider},
    query::{AggregateFunc, CompareOp, Direction, FieldPath},
    traits::Record,
    value::Value,
};

// re-exports
pub use dialect::SqlDialect;
pub use expr::SqlExpr;
pub use query::SqlQuery;
pub use render::SqlStatement;

///
/// SqlTable
/// Table name and typed columns the provider binds member paths against.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SqlTable {
    name: String,
    columns: Vec<(String, FieldKind)>,
    key: Option<String>,
}

impl SqlTable {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            key: None,
        }
    }

    /// One column per registered field of `T`, named by dotted path.
    #[must_use]
    pub fn of<T: Record>() -> Self {
        let shape = T::shape();

        Self {
            name: shape.name().to_string(),
            columns: shape
                .fields()
                .iter()
                .map(|f| (f.model().path.clone(), f.model().kind))
                .collect(),
            key: None,
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.columns.push((name.into(), kind));
        self
    }

    /// Declare the column rows are stored in order of. Ordered levels that
    /// still read it get it as a final ascending tiebreak, so rows with equal
    /// sort keys keep storage order the way a stable sort would.
    #[must_use]
    pub fn key(mut self, column: impl Into<String>) -> Self {
        self.key = Some(column.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[(String, FieldKind)] {
        &self.columns
    }
}

///
/// SqlProvider
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SqlProvider {
    dialect: SqlDialect,
}

impl SqlProvider {
    pub const NAME: &'static str = "sql";

    #[must_use]
    pub const fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    #[must_use]
    pub const fn from_config(config: &SqlConfig) -> Self {
        Self::new(config.dialect)
    }

    #[must_use]
    pub const fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Root query selecting every row of `table`.
    #[must_use]
    pub fn query(&self, table: &SqlTable) -> SqlQuery {
        SqlQuery::from_table(
            self.dialect,
            &table.name,
            table.columns.clone(),
            table.key.clone(),
        )
    }
}

impl QueryProvider for SqlProvider {
    type Query = SqlQuery;
    type Expr = SqlExpr;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn member(&self, query: &SqlQuery, path: &FieldPath) -> Result<Member<SqlExpr>, QueryError> {
        let dotted = path.dotted();
        let level = &query.level;

        let Some((_, kind)) = level
            .output_columns()
            .into_iter()
            .find(|(name, _)| *name == dotted)
        else {
            let shape = match &level.source {
                query::Source::Table(name) if level.select.is_none() && level.group.is_none() => {
                    name.clone()
                }
                _ => "subquery".to_string(),
            };
            return Err(PathNotFoundError::provider(dotted, shape).into());
        };

        let expr = match (&level.select, &level.group, dotted.as_str()) {
            (None, Some(_), "key") => SqlExpr::GroupKey,
            (None, Some(_), "count") => SqlExpr::GroupCount,
            _ => SqlExpr::Column(dotted),
        };

        Ok(Member::new(expr, kind))
    }

    fn group_member(
        &self,
        query: &SqlQuery,
        path: &FieldPath,
    ) -> Result<Member<SqlExpr>, QueryError> {
        let level = &query.level;
        if level.group.is_none() || level.select.is_some() {
            return Err(BuildError::AggregateOutsideGroup.into());
        }

        let dotted = path.dotted();
        level
            .columns
            .iter()
            .find(|(name, _)| *name == dotted)
            .map(|(_, kind)| Member::new(SqlExpr::Column(dotted.clone()), *kind))
            .ok_or_else(|| PathNotFoundError::provider(dotted, "group members").into())
    }

    fn literal(&self, value: Value) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::Param(value))
    }

    fn constant(&self, value: bool) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::Bool(value))
    }

    fn compare(&self, op: CompareOp, left: SqlExpr, right: SqlExpr) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn is_null(&self, expr: SqlExpr, negated: bool) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::IsNull {
            expr: Box::new(expr),
            negated,
        })
    }

    fn and(&self, children: Vec<SqlExpr>) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::And(children))
    }

    fn or(&self, children: Vec<SqlExpr>) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::Or(children))
    }

    fn not(&self, inner: SqlExpr) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::Not(Box::new(inner)))
    }

    fn like(&self, expr: SqlExpr, pattern: &str) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::Like {
            expr: Box::new(expr),
            pattern: pattern.to_string(),
        })
    }

    fn in_set(&self, expr: SqlExpr, items: Vec<SqlExpr>) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::In {
            expr: Box::new(expr),
            items,
        })
    }

    fn bit_and(&self, left: SqlExpr, right: SqlExpr) -> Result<SqlExpr, QueryError> {
        if !self.dialect.supports_bitwise() {
            return Err(self.unsupported(&format!("bitwise and in {} dialect", self.dialect)));
        }

        Ok(SqlExpr::BitAnd(Box::new(left), Box::new(right)))
    }

    fn aggregate(&self, func: AggregateFunc, arg: Option<SqlExpr>) -> Result<SqlExpr, QueryError> {
        Ok(SqlExpr::Aggregate {
            func,
            arg: arg.map(Box::new),
        })
    }

    fn filter(&self, query: SqlQuery, predicate: SqlExpr) -> Result<SqlQuery, QueryError> {
        Ok(query.add_filter(predicate))
    }

    fn order_by(
        &self,
        query: SqlQuery,
        keys: Vec<(SqlExpr, Direction)>,
    ) -> Result<SqlQuery, QueryError> {
        Ok(query.add_order(keys))
    }

    fn skip(&self, query: SqlQuery, count: u64) -> Result<SqlQuery, QueryError> {
        Ok(query.add_skip(count))
    }

    fn take(&self, query: SqlQuery, count: u64) -> Result<SqlQuery, QueryError> {
        Ok(query.add_take(count))
    }

    fn project(
        &self,
        query: SqlQuery,
        columns: Vec<Column<SqlExpr>>,
    ) -> Result<SqlQuery, QueryError> {
        Ok(query.add_projection(columns))
    }

    fn group_by(
        &self,
        query: SqlQuery,
        key: SqlExpr,
        kind: FieldKind,
    ) -> Result<SqlQuery, QueryError> {
        Ok(query.add_group(key, kind))
    }
}
