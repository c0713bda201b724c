//! In-process table store with its own native plan and evaluator.
//!
//! Translation appends one native stage per operation; `execute` runs the
//! stages eagerly over the stored rows. The store is deliberately
//! independent of the in-memory engine so the two can be cross-checked.

mod plan;

#[cfg(test)]
mod tests;

use crate::{
    error::{BuildError, PathNotFoundError, QueryError},
    model::{FieldKind, Row},
    obs::sink::{MetricsEvent, record},
    provider::{Column, Member, QueryProvider},
    query::{AggregateFunc, CompareOp, Direction, FieldPath, predicate::LikePattern},
    traits::Record,
    value::Value,
};
use std::sync::Arc;
use tracing::debug;

// re-exports
pub use plan::{StoreExpr, StoreStage};

///
/// Table
/// Named rows plus the declared kind of every column.
///

#[derive(Clone, Debug, Default)]
pub struct Table {
    name: String,
    columns: Vec<(String, FieldKind)>,
    rows: Vec<Row>,
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Materialize records, declaring one column per registered field.
    #[must_use]
    pub fn from_records<T: Record>(records: impl IntoIterator<Item = T>) -> Self {
        let shape = T::shape();
        let columns = shape
            .fields()
            .iter()
            .map(|field| (field.model().path.clone(), field.model().kind))
            .collect();

        Self {
            name: shape.name().to_string(),
            columns,
            rows: records.into_iter().map(|r| r.to_row()).collect(),
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, k)) => *k = kind,
            None => self.columns.push((name, kind)),
        }
        self
    }

    #[must_use]
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn insert(&mut self, row: Row) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[(String, FieldKind)] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

///
/// TableCapabilities
/// Native primitives the store evaluates; missing ones fail translation.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TableCapabilities {
    pub bitwise: bool,
    pub grouping: bool,
    pub like: bool,
    pub projection: bool,
}

impl TableCapabilities {
    #[must_use]
    pub const fn full() -> Self {
        Self {
            bitwise: true,
            grouping: true,
            like: true,
            projection: true,
        }
    }

    /// Filtering, ordering and paging only.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            bitwise: false,
            grouping: false,
            like: false,
            projection: false,
        }
    }
}

impl Default for TableCapabilities {
    fn default() -> Self {
        Self::full()
    }
}

///
/// TableQuery
/// Native plan: the source table plus stages in application order.
///

#[derive(Clone, Debug)]
pub struct TableQuery {
    table: Arc<Table>,
    stages: Vec<StoreStage>,
    scope: Scope,
}

impl TableQuery {
    #[must_use]
    pub fn stages(&self) -> &[StoreStage] {
        &self.stages
    }

    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Output column names at the end of the plan.
    #[must_use]
    pub fn output_columns(&self) -> Vec<String> {
        self.scope
            .columns()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    fn push(mut self, stage: StoreStage, scope: Option<Scope>) -> Self {
        self.stages.push(stage);
        if let Some(scope) = scope {
            self.scope = scope;
        }
        self
    }
}

// Shape of the items between two stages.
#[derive(Clone, Debug)]
enum Scope {
    Rows {
        name: String,
        columns: Vec<(String, FieldKind)>,
    },
    Grouped {
        key: FieldKind,
        members: Vec<(String, FieldKind)>,
    },
}

impl Scope {
    fn columns(&self) -> Vec<(String, FieldKind)> {
        match self {
            Self::Rows { columns, .. } => columns.clone(),
            Self::Grouped { key, .. } => {
                vec![("key".to_string(), *key), ("count".to_string(), FieldKind::Int)]
            }
        }
    }
}

fn find_column(columns: &[(String, FieldKind)], path: &str) -> Option<FieldKind> {
    columns
        .iter()
        .find_map(|(name, kind)| (name == path).then_some(*kind))
}

///
/// TableProvider
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TableProvider {
    capabilities: TableCapabilities,
}

impl TableProvider {
    pub const NAME: &'static str = "table";

    #[must_use]
    pub const fn new() -> Self {
        Self {
            capabilities: TableCapabilities::full(),
        }
    }

    #[must_use]
    pub const fn with_capabilities(capabilities: TableCapabilities) -> Self {
        Self { capabilities }
    }

    #[must_use]
    pub const fn capabilities(&self) -> TableCapabilities {
        self.capabilities
    }

    /// Root query reading every row of `table`.
    #[must_use]
    pub fn query(&self, table: Arc<Table>) -> TableQuery {
        let scope = Scope::Rows {
            name: table.name.clone(),
            columns: table.columns.clone(),
        };

        TableQuery {
            table,
            stages: Vec::new(),
            scope,
        }
    }

    /// Run the plan against the stored rows.
    #[must_use]
    pub fn execute(&self, query: &TableQuery) -> Vec<Row> {
        let rows = plan::run(&query.table.rows, &query.stages);
        debug!(
            table = query.table.name(),
            stages = query.stages.len(),
            rows = rows.len(),
            "executed table plan"
        );
        record(MetricsEvent::TableExecuted {
            rows: u64::try_from(rows.len()).unwrap_or(u64::MAX),
        });

        rows
    }

    fn require(&self, enabled: bool, construct: &str) -> Result<(), QueryError> {
        if enabled {
            Ok(())
        } else {
            Err(self.unsupported(construct))
        }
    }
}

impl QueryProvider for TableProvider {
    type Query = TableQuery;
    type Expr = StoreExpr;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn member(&self, query: &TableQuery, path: &FieldPath) -> Result<Member<StoreExpr>, QueryError> {
        let dotted = path.dotted();

        match &query.scope {
            Scope::Rows { name, columns } => find_column(columns, &dotted)
                .map(|kind| Member::new(StoreExpr::Column(dotted.clone()), kind))
                .ok_or_else(|| PathNotFoundError::provider(dotted, name.as_str()).into()),
            Scope::Grouped { key, .. } => match dotted.as_str() {
                "key" => Ok(Member::new(StoreExpr::GroupKey, *key)),
                "count" => Ok(Member::new(StoreExpr::GroupCount, FieldKind::Int)),
                _ => Err(PathNotFoundError::provider(dotted, "group").into()),
            },
        }
    }

    fn group_member(
        &self,
        query: &TableQuery,
        path: &FieldPath,
    ) -> Result<Member<StoreExpr>, QueryError> {
        let Scope::Grouped { members, .. } = &query.scope else {
            return Err(BuildError::AggregateOutsideGroup.into());
        };
        let dotted = path.dotted();

        find_column(members, &dotted)
            .map(|kind| Member::new(StoreExpr::Column(dotted.clone()), kind))
            .ok_or_else(|| PathNotFoundError::provider(dotted, "group members").into())
    }

    fn literal(&self, value: Value) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::Const(value))
    }

    fn constant(&self, value: bool) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::Const(Value::Bool(value)))
    }

    fn compare(
        &self,
        op: CompareOp,
        left: StoreExpr,
        right: StoreExpr,
    ) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn is_null(&self, expr: StoreExpr, negated: bool) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::IsNull {
            expr: Box::new(expr),
            negated,
        })
    }

    fn and(&self, children: Vec<StoreExpr>) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::And(children))
    }

    fn or(&self, children: Vec<StoreExpr>) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::Or(children))
    }

    fn not(&self, inner: StoreExpr) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::Not(Box::new(inner)))
    }

    fn like(&self, expr: StoreExpr, pattern: &str) -> Result<StoreExpr, QueryError> {
        self.require(self.capabilities.like, "pattern match")?;

        Ok(StoreExpr::Like {
            expr: Box::new(expr),
            pattern: LikePattern::compile(pattern),
        })
    }

    fn in_set(&self, expr: StoreExpr, items: Vec<StoreExpr>) -> Result<StoreExpr, QueryError> {
        Ok(StoreExpr::In {
            expr: Box::new(expr),
            items,
        })
    }

    fn bit_and(&self, left: StoreExpr, right: StoreExpr) -> Result<StoreExpr, QueryError> {
        self.require(self.capabilities.bitwise, "bitwise and")?;

        Ok(StoreExpr::BitAnd(Box::new(left), Box::new(right)))
    }

    fn aggregate(
        &self,
        func: AggregateFunc,
        arg: Option<StoreExpr>,
    ) -> Result<StoreExpr, QueryError> {
        self.require(self.capabilities.grouping, "aggregates")?;

        Ok(StoreExpr::Aggregate {
            func,
            arg: arg.map(Box::new),
        })
    }

    fn filter(&self, query: TableQuery, predicate: StoreExpr) -> Result<TableQuery, QueryError> {
        Ok(query.push(StoreStage::Filter(predicate), None))
    }

    fn order_by(
        &self,
        query: TableQuery,
        keys: Vec<(StoreExpr, Direction)>,
    ) -> Result<TableQuery, QueryError> {
        Ok(query.push(StoreStage::Order(keys), None))
    }

    fn skip(&self, query: TableQuery, count: u64) -> Result<TableQuery, QueryError> {
        Ok(query.push(StoreStage::Skip(count), None))
    }

    fn take(&self, query: TableQuery, count: u64) -> Result<TableQuery, QueryError> {
        Ok(query.push(StoreStage::Take(count), None))
    }

    fn project(
        &self,
        query: TableQuery,
        columns: Vec<Column<StoreExpr>>,
    ) -> Result<TableQuery, QueryError> {
        self.require(self.capabilities.projection, "projection")?;

        let scope = Scope::Rows {
            name: "projection".to_string(),
            columns: columns.iter().map(|c| (c.name.clone(), c.kind)).collect(),
        };
        let stage = StoreStage::Project(columns.into_iter().map(|c| (c.name, c.expr)).collect());

        Ok(query.push(stage, Some(scope)))
    }

    fn group_by(
        &self,
        query: TableQuery,
        key: StoreExpr,
        kind: FieldKind,
    ) -> Result<TableQuery, QueryError> {
        self.require(self.capabilities.grouping, "grouping")?;

        let scope = Scope::Grouped {
            key: kind,
            members: query.scope.columns(),
        };

        Ok(query.push(StoreStage::Group(key), Some(scope)))
    }
}
