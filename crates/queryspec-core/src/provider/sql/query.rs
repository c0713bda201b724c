use crate::{
    model::FieldKind,
    provider::{
        Column,
        sql::{dialect::SqlDialect, expr::SqlExpr},
    },
    query::Direction,
};
use tracing::trace;

///
/// SqlQuery
///
/// A `SELECT` built level by level. Each level holds clauses in SQL
/// evaluation order; an operation that cannot join the current level
/// without changing its meaning wraps the level as a subquery first.
///

#[derive(Clone, Debug)]
pub struct SqlQuery {
    pub(super) dialect: SqlDialect,
    pub(super) key: Option<String>,
    pub(super) level: Level,
}

#[derive(Clone, Debug)]
pub(super) enum Source {
    Table(String),
    Subquery(Box<Level>),
}

#[derive(Clone, Debug)]
pub(super) struct Grouping {
    pub(super) key: SqlExpr,
    pub(super) kind: FieldKind,
}

#[derive(Clone, Debug)]
pub(super) struct Level {
    pub(super) source: Source,
    pub(super) columns: Vec<(String, FieldKind)>,
    pub(super) filters: Vec<SqlExpr>,
    pub(super) group: Option<Grouping>,
    pub(super) having: Vec<SqlExpr>,
    pub(super) select: Option<Vec<Column<SqlExpr>>>,
    pub(super) order: Vec<(SqlExpr, Direction)>,
    /// Order-carrying columns inherited from a wrapped level; passed through
    /// `*` but never part of the visible output.
    pub(super) hidden: Vec<String>,
    /// Whether the input column named after the table key still holds it.
    pub(super) keyed: bool,
    pub(super) offset: u64,
    pub(super) limit: Option<u64>,
}

impl Level {
    pub(super) const fn new(source: Source, columns: Vec<(String, FieldKind)>) -> Self {
        Self {
            source,
            columns,
            filters: Vec::new(),
            group: None,
            having: Vec::new(),
            select: None,
            order: Vec::new(),
            hidden: Vec::new(),
            keyed: false,
            offset: 0,
            limit: None,
        }
    }

    pub(super) const fn is_paged(&self) -> bool {
        self.offset > 0 || self.limit.is_some()
    }

    /// Columns a consumer of this level sees.
    pub(super) fn output_columns(&self) -> Vec<(String, FieldKind)> {
        if let Some(select) = &self.select {
            return select.iter().map(|c| (c.name.clone(), c.kind)).collect();
        }
        match &self.group {
            Some(group) => vec![
                ("key".to_string(), group.kind),
                ("count".to_string(), FieldKind::Int),
            ],
            None => self.columns.clone(),
        }
    }

    /// Full ordering of this level, including the implicit group-key order.
    pub(super) fn effective_order(&self) -> Vec<(SqlExpr, Direction)> {
        let mut order = self.order.clone();
        if self.group.is_some() {
            order.push((SqlExpr::GroupKey, Direction::Asc));
        }
        order
    }

    /// Express one of this level's expressions over its output columns.
    fn export(&self, expr: &SqlExpr) -> Option<SqlExpr> {
        if let Some(select) = &self.select {
            return select
                .iter()
                .find(|c| c.expr == *expr)
                .map(|c| SqlExpr::Column(c.name.clone()));
        }
        match (&self.group, expr) {
            (Some(_), SqlExpr::GroupKey) => Some(SqlExpr::Column("key".to_string())),
            (Some(_), SqlExpr::GroupCount) => Some(SqlExpr::Column("count".to_string())),
            (Some(_), _) => None,
            (None, other) => Some(other.clone()),
        }
    }
}

impl SqlQuery {
    pub(super) fn from_table(
        dialect: SqlDialect,
        name: &str,
        columns: Vec<(String, FieldKind)>,
        key: Option<String>,
    ) -> Self {
        let mut level = Level::new(Source::Table(name.to_string()), columns);
        level.keyed = key
            .as_ref()
            .is_some_and(|key| level.columns.iter().any(|(column, _)| column == key));

        Self {
            dialect,
            key,
            level,
        }
    }

    #[must_use]
    pub const fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Nesting depth; zero for a single `SELECT`.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut level = &self.level;
        while let Source::Subquery(inner) = &level.source {
            depth += 1;
            level = inner;
        }
        depth
    }

    /// Move the current level into a subquery. Its full ordering is carried
    /// to the new level; keys the output columns cannot express are exported
    /// as hidden columns.
    fn wrap(&mut self) {
        let depth = self.depth();
        let columns = self.level.output_columns();
        let mut hidden = if self.level.select.is_none() && self.level.group.is_none() {
            self.level.hidden.clone()
        } else {
            Vec::new()
        };
        let keyed = self.exports_key();

        let mut carried = Vec::new();
        for (expr, direction) in self.level.effective_order() {
            let exported = match self.level.export(&expr) {
                Some(exported) => exported,
                None => {
                    let name = format!("__order_{depth}_{}", hidden.len());
                    if let Some(select) = &mut self.level.select {
                        select.push(Column {
                            name: name.clone(),
                            expr,
                            kind: FieldKind::Any,
                        });
                    }
                    hidden.push(name.clone());
                    SqlExpr::Column(name)
                }
            };
            carried.push((exported, direction));
        }

        let inner = std::mem::replace(
            &mut self.level,
            Level::new(Source::Table(String::new()), Vec::new()),
        );
        self.level = Level::new(Source::Subquery(Box::new(inner)), columns);
        self.level.order = carried;
        self.level.hidden = hidden;
        self.level.keyed = keyed;

        trace!(depth = self.depth(), "wrapped sql level");
    }

    /// Whether the current level passes the table key through under its
    /// own name.
    fn exports_key(&self) -> bool {
        let Some(key) = &self.key else {
            return false;
        };
        if !self.level.keyed || self.level.group.is_some() {
            return false;
        }

        match &self.level.select {
            Some(select) => select
                .iter()
                .any(|c| c.name == *key && c.expr == SqlExpr::Column(key.clone())),
            None => true,
        }
    }

    pub(super) fn add_filter(mut self, predicate: SqlExpr) -> Self {
        let predicate = if self.level.is_paged() || self.level.select.is_some() {
            self.wrap();
            predicate.rebase()
        } else {
            predicate
        };

        if self.level.group.is_some() {
            self.level.having.push(predicate);
        } else {
            self.level.filters.push(predicate);
        }
        self
    }

    pub(super) fn add_order(mut self, keys: Vec<(SqlExpr, Direction)>) -> Self {
        let keys = if self.level.is_paged() || self.level.select.is_some() {
            self.wrap();
            keys.into_iter().map(|(e, d)| (e.rebase(), d)).collect()
        } else {
            keys
        };

        // a later stable sort takes precedence over the carried order
        let carried = std::mem::take(&mut self.level.order);
        self.level.order = keys;
        self.level.order.extend(carried);
        self
    }

    pub(super) fn add_skip(mut self, count: u64) -> Self {
        self.level.offset = self.level.offset.saturating_add(count);
        self.level.limit = self.level.limit.map(|limit| limit.saturating_sub(count));
        self
    }

    pub(super) fn add_take(mut self, count: u64) -> Self {
        self.level.limit = Some(self.level.limit.map_or(count, |limit| limit.min(count)));
        self
    }

    pub(super) fn add_projection(mut self, columns: Vec<Column<SqlExpr>>) -> Self {
        let columns = if self.level.select.is_some() {
            self.wrap();
            columns
                .into_iter()
                .map(|c| Column {
                    expr: c.expr.rebase(),
                    ..c
                })
                .collect()
        } else {
            columns
        };

        self.level.select = Some(columns);
        self
    }

    pub(super) fn add_group(mut self, key: SqlExpr, kind: FieldKind) -> Self {
        let key = if self.level.is_paged()
            || self.level.select.is_some()
            || self.level.group.is_some()
        {
            self.wrap();
            key.rebase()
        } else {
            key
        };

        // groups are re-ordered by key
        self.level.order.clear();
        self.level.group = Some(Grouping { key, kind });
        self
    }
}
