use crate::{
    provider::sql::{
        dialect::{SqlDialect, like_to_glob},
        expr::SqlExpr,
        query::{Level, Source, SqlQuery},
    },
    query::{AggregateFunc, Direction},
    value::Value,
};
use std::fmt;

///
/// SqlStatement
/// Rendered SQL text plus its parameters in placeholder order.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl SqlQuery {
    /// Render to SQL text and ordered parameters.
    ///
    /// Every ordered level emits its full `ORDER BY`; a subquery's ordering
    /// is never relied on. Ties fall back to the declared table key when the
    /// level still reads it, otherwise their order is left to the database.
    #[must_use]
    pub fn render(&self) -> SqlStatement {
        let mut writer = Writer {
            dialect: self.dialect,
            key: self.key.clone(),
            params: Vec::new(),
            aliases: 0,
            qualifier: None,
        };
        let sql = writer.level(&self.level, true);

        SqlStatement {
            sql,
            params: writer.params,
        }
    }
}

struct Writer {
    dialect: SqlDialect,
    key: Option<String>,
    params: Vec<Value>,
    aliases: usize,
    // source name columns are qualified with while rendering a level whose
    // output names could shadow its input columns
    qualifier: Option<String>,
}

impl Writer {
    fn level(&mut self, level: &Level, top: bool) -> String {
        let group_key = level.group.as_ref().map(|g| &g.key);
        let explicit_hidden =
            top && level.select.is_none() && level.group.is_none() && !level.hidden.is_empty();

        // aliases are reserved before the body so placeholders stay in text order
        let source_name = match &level.source {
            Source::Table(name) => self.dialect.quote(name),
            Source::Subquery(_) => {
                self.aliases += 1;
                self.dialect.quote(&format!("t{}", self.aliases))
            }
        };
        let qualify = level.select.is_some() || explicit_hidden;
        let outer = std::mem::replace(&mut self.qualifier, qualify.then(|| source_name.clone()));

        let select = match (&level.select, group_key) {
            (Some(columns), _) => columns
                .iter()
                .map(|c| {
                    let expr = self.expr(&c.expr, group_key);
                    format!("{expr} AS {}", self.dialect.quote(&c.name))
                })
                .collect::<Vec<_>>()
                .join(", "),
            (None, Some(key)) => {
                let key = self.expr(key, None);
                format!(
                    "{key} AS {}, COUNT(*) AS {}",
                    self.dialect.quote("key"),
                    self.dialect.quote("count")
                )
            }
            (None, None) if explicit_hidden => level
                .columns
                .iter()
                .map(|(name, _)| self.column(name))
                .collect::<Vec<_>>()
                .join(", "),
            (None, None) => "*".to_string(),
        };

        let from = match &level.source {
            Source::Table(_) => source_name,
            Source::Subquery(inner) => {
                let inner = self.level(inner, false);
                format!("({inner}) AS {source_name}")
            }
        };

        let mut sql = format!("SELECT {select} FROM {from}");

        if !level.filters.is_empty() {
            let filters = self.conjunction(&level.filters, None);
            sql.push_str(&format!(" WHERE {filters}"));
        }
        if let Some(key) = group_key {
            let key = self.expr(key, None);
            sql.push_str(&format!(" GROUP BY {key}"));
        }
        if !level.having.is_empty() {
            let having = self.conjunction(&level.having, group_key);
            sql.push_str(&format!(" HAVING {having}"));
        }

        let order = self.order_with_tiebreak(level);
        if !order.is_empty() {
            let keys = order
                .iter()
                .map(|(expr, direction)| {
                    let expr = self.expr(expr, group_key);
                    match direction {
                        Direction::Asc => format!("{expr} ASC NULLS FIRST"),
                        Direction::Desc => format!("{expr} DESC NULLS LAST"),
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {keys}"));
        }

        let paging = self.dialect.paging(level.offset, level.limit);
        if !paging.is_empty() {
            sql.push(' ');
            sql.push_str(&paging);
        }

        self.qualifier = outer;

        sql
    }

    /// Level ordering plus the table key as a final tiebreak when the level
    /// sorts ungrouped rows that still carry it.
    fn order_with_tiebreak(&self, level: &Level) -> Vec<(SqlExpr, Direction)> {
        let mut order = level.effective_order();
        if order.is_empty() || level.group.is_some() {
            return order;
        }

        if let Some(key) = self.key.as_ref().filter(|_| level.keyed) {
            let tiebreak = SqlExpr::Column(key.clone());
            if !order.iter().any(|(expr, _)| *expr == tiebreak) {
                order.push((tiebreak, Direction::Asc));
            }
        }

        order
    }

    fn column(&self, name: &str) -> String {
        let column = self.dialect.quote(name);
        match &self.qualifier {
            Some(source) => format!("{source}.{column}"),
            None => column,
        }
    }

    fn conjunction(&mut self, exprs: &[SqlExpr], group_key: Option<&SqlExpr>) -> String {
        exprs
            .iter()
            .map(|e| self.expr(e, group_key))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        self.dialect.placeholder(self.params.len())
    }

    fn expr(&mut self, expr: &SqlExpr, group_key: Option<&SqlExpr>) -> String {
        match expr {
            SqlExpr::Column(name) => self.column(name),
            SqlExpr::Param(value) => self.param(value.clone()),
            SqlExpr::Bool(true) => "TRUE".to_string(),
            SqlExpr::Bool(false) => "FALSE".to_string(),
            SqlExpr::GroupKey => match group_key {
                Some(key) => self.expr(key, None),
                None => "NULL".to_string(),
            },
            SqlExpr::GroupCount => "COUNT(*)".to_string(),
            SqlExpr::Aggregate { func, arg } => match (func, arg) {
                (AggregateFunc::Count, None) => "COUNT(*)".to_string(),
                (func, Some(arg)) => {
                    let arg = self.expr(arg, group_key);
                    format!("{}({arg})", func.name().to_ascii_uppercase())
                }
                (func, None) => format!("{}(*)", func.name().to_ascii_uppercase()),
            },
            SqlExpr::Compare { op, left, right } => {
                let left = self.expr(left, group_key);
                let right = self.expr(right, group_key);
                format!("{left} {} {right}", op.symbol())
            }
            SqlExpr::IsNull { expr, negated } => {
                let expr = self.expr(expr, group_key);
                if *negated {
                    format!("{expr} IS NOT NULL")
                } else {
                    format!("{expr} IS NULL")
                }
            }
            SqlExpr::In { expr, items } => {
                let expr = self.expr(expr, group_key);
                let items = items
                    .iter()
                    .map(|item| self.expr(item, group_key))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{expr} IN ({items})")
            }
            SqlExpr::Like { expr, pattern } => {
                let expr = self.expr(expr, group_key);
                match self.dialect {
                    SqlDialect::Ansi => {
                        let p = self.param(Value::Text(pattern.clone()));
                        format!("{expr} LIKE {p}")
                    }
                    SqlDialect::Postgres => {
                        let p = self.param(Value::Text(pattern.clone()));
                        format!("{expr} LIKE {p} ESCAPE ''")
                    }
                    SqlDialect::Sqlite => {
                        let p = self.param(Value::Text(like_to_glob(pattern)));
                        format!("{expr} GLOB {p}")
                    }
                }
            }
            SqlExpr::BitAnd(left, right) => {
                let left = self.expr(left, group_key);
                let right = self.expr(right, group_key);
                format!("({left} & {right})")
            }
            SqlExpr::And(children) => self.junction(children, "AND", "TRUE", group_key),
            SqlExpr::Or(children) => self.junction(children, "OR", "FALSE", group_key),
            SqlExpr::Not(inner) => {
                let inner = self.expr(inner, group_key);
                format!("NOT ({inner})")
            }
        }
    }

    fn junction(
        &mut self,
        children: &[SqlExpr],
        op: &str,
        empty: &str,
        group_key: Option<&SqlExpr>,
    ) -> String {
        match children {
            [] => empty.to_string(),
            [only] => self.expr(only, group_key),
            _ => {
                let parts = children
                    .iter()
                    .map(|c| self.expr(c, group_key))
                    .collect::<Vec<_>>()
                    .join(&format!(" {op} "));
                format!("({parts})")
            }
        }
    }
}
