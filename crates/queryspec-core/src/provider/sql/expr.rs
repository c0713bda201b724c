use crate::{
    query::{AggregateFunc, CompareOp},
    value::Value,
};

///
/// SqlExpr
///
/// SQL expression tree. `GroupKey` / `GroupCount` stand for the grouping
/// key and `COUNT(*)` of the level they were bound on; they become plain
/// column references once that level is wrapped as a subquery.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SqlExpr {
    Aggregate {
        func: AggregateFunc,
        arg: Option<Box<Self>>,
    },
    And(Vec<Self>),
    BitAnd(Box<Self>, Box<Self>),
    Bool(bool),
    Column(String),
    Compare {
        op: CompareOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    GroupCount,
    GroupKey,
    In {
        expr: Box<Self>,
        items: Vec<Self>,
    },
    IsNull {
        expr: Box<Self>,
        negated: bool,
    },
    Like {
        expr: Box<Self>,
        pattern: String,
    },
    Not(Box<Self>),
    Or(Vec<Self>),
    Param(Value),
}

impl SqlExpr {
    /// Re-express against the output columns of a wrapped grouped level.
    #[must_use]
    pub(crate) fn rebase(self) -> Self {
        let boxed = |e: Box<Self>| Box::new(e.rebase());
        let all = |v: Vec<Self>| -> Vec<Self> { v.into_iter().map(Self::rebase).collect() };

        match self {
            Self::GroupKey => Self::Column("key".to_string()),
            Self::GroupCount => Self::Column("count".to_string()),
            Self::Aggregate { func, arg } => Self::Aggregate {
                func,
                arg: arg.map(boxed),
            },
            Self::And(children) => Self::And(all(children)),
            Self::Or(children) => Self::Or(all(children)),
            Self::Not(inner) => Self::Not(boxed(inner)),
            Self::BitAnd(left, right) => Self::BitAnd(boxed(left), boxed(right)),
            Self::Compare { op, left, right } => Self::Compare {
                op,
                left: boxed(left),
                right: boxed(right),
            },
            Self::In { expr, items } => Self::In {
                expr: boxed(expr),
                items: all(items),
            },
            Self::IsNull { expr, negated } => Self::IsNull {
                expr: boxed(expr),
                negated,
            },
            Self::Like { expr, pattern } => Self::Like {
                expr: boxed(expr),
                pattern,
            },
            leaf @ (Self::Bool(_) | Self::Column(_) | Self::Param(_)) => leaf,
        }
    }
}
