use crate::{
    executor::aggregate,
    model::Row,
    query::{
        AggregateFunc, CompareOp, Direction,
        predicate::{LikePattern, eval},
    },
    value::{Truth, Value, sort_cmp, strict_order_cmp},
};
use std::cmp::Ordering;

///
/// StoreExpr
///
/// Native expression tree. Predicates evaluate to `Bool` or `Null`
/// (unknown), the way a SQL engine would.
///

#[derive(Clone, Debug, PartialEq)]
pub enum StoreExpr {
    Aggregate {
        func: AggregateFunc,
        arg: Option<Box<Self>>,
    },
    And(Vec<Self>),
    BitAnd(Box<Self>, Box<Self>),
    Column(String),
    Compare {
        op: CompareOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    Const(Value),
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
        pattern: LikePattern,
    },
    Not(Box<Self>),
    Or(Vec<Self>),
}

///
/// StoreStage
///

#[derive(Clone, Debug, PartialEq)]
pub enum StoreStage {
    Filter(StoreExpr),
    Group(StoreExpr),
    Order(Vec<(StoreExpr, Direction)>),
    Project(Vec<(String, StoreExpr)>),
    Skip(u64),
    Take(u64),
}

// Item flowing between stages. Group members are kept as rows.
enum Item {
    Row(Row),
    Group { key: Value, members: Vec<Row> },
}

#[derive(Clone, Copy)]
enum ItemRef<'a> {
    Row(&'a Row),
    Group { key: &'a Value, members: &'a [Row] },
}

impl Item {
    fn view(&self) -> ItemRef<'_> {
        match self {
            Self::Row(row) => ItemRef::Row(row),
            Self::Group { key, members } => ItemRef::Group {
                key,
                members: members.as_slice(),
            },
        }
    }

    fn into_row(self) -> Row {
        match self {
            Self::Row(row) => row,
            Self::Group { key, members } => Row::new()
                .with("key", key)
                .with("count", count_value(members.len())),
        }
    }
}

fn count_value(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

const fn truth_value(truth: Truth) -> Value {
    match truth {
        Truth::True => Value::Bool(true),
        Truth::False => Value::Bool(false),
        Truth::Unknown => Value::Null,
    }
}

const fn value_truth(value: &Value) -> Truth {
    match value {
        Value::Bool(b) => Truth::from_bool(*b),
        _ => Truth::Unknown,
    }
}

impl StoreExpr {
    fn eval(&self, item: ItemRef<'_>) -> Value {
        match self {
            Self::Const(value) => value.clone(),
            Self::Column(name) => match item {
                ItemRef::Row(row) => row.get(name).cloned().unwrap_or(Value::Null),
                ItemRef::Group { .. } => Value::Null,
            },
            Self::GroupKey => match item {
                ItemRef::Group { key, .. } => key.clone(),
                ItemRef::Row(_) => Value::Null,
            },
            Self::GroupCount => match item {
                ItemRef::Group { members, .. } => count_value(members.len()),
                ItemRef::Row(_) => Value::Null,
            },
            Self::Aggregate { func, arg } => match item {
                ItemRef::Group { members, .. } => fold(*func, arg.as_deref(), members),
                ItemRef::Row(_) => Value::Null,
            },
            Self::Compare { op, left, right } => {
                let (left, right) = (left.eval(item), right.eval(item));
                truth_value(Truth::from_option(
                    strict_order_cmp(&left, &right).map(|ord| op.matches(ord)),
                ))
            }
            Self::IsNull { expr, negated } => Value::Bool(expr.eval(item).is_null() != *negated),
            Self::In { expr, items } => {
                let value = expr.eval(item);
                let truth = items.iter().fold(Truth::False, |acc, candidate| {
                    let candidate = candidate.eval(item);
                    acc.or(Truth::from_option(
                        strict_order_cmp(&value, &candidate).map(|ord| ord == Ordering::Equal),
                    ))
                });
                truth_value(truth)
            }
            Self::Like { expr, pattern } => truth_value(eval::like(&expr.eval(item), pattern)),
            Self::BitAnd(left, right) => eval::bit_and(&left.eval(item), &right.eval(item)),
            Self::And(children) => truth_value(
                children
                    .iter()
                    .fold(Truth::True, |acc, c| acc.and(value_truth(&c.eval(item)))),
            ),
            Self::Or(children) => truth_value(
                children
                    .iter()
                    .fold(Truth::False, |acc, c| acc.or(value_truth(&c.eval(item)))),
            ),
            Self::Not(inner) => truth_value(!value_truth(&inner.eval(item))),
        }
    }
}

fn fold(func: AggregateFunc, arg: Option<&StoreExpr>, members: &[Row]) -> Value {
    match arg {
        None => count_value(members.len()),
        Some(arg) => aggregate::fold(
            func,
            members.iter().map(|row| arg.eval(ItemRef::Row(row))),
        ),
    }
}

/// Execute stages eagerly over `rows`.
pub(super) fn run(rows: &[Row], stages: &[StoreStage]) -> Vec<Row> {
    let mut items: Vec<Item> = rows.iter().cloned().map(Item::Row).collect();

    for stage in stages {
        items = match stage {
            StoreStage::Filter(predicate) => items
                .into_iter()
                .filter(|item| predicate.eval(item.view()) == Value::Bool(true))
                .collect(),
            StoreStage::Order(keys) => order(items, keys),
            StoreStage::Skip(n) => items
                .into_iter()
                .skip(usize::try_from(*n).unwrap_or(usize::MAX))
                .collect(),
            StoreStage::Take(n) => {
                items.truncate(usize::try_from(*n).unwrap_or(usize::MAX));
                items
            }
            StoreStage::Project(columns) => items
                .into_iter()
                .map(|item| {
                    let view = item.view();
                    Item::Row(
                        columns
                            .iter()
                            .map(|(name, expr)| (name.clone(), expr.eval(view)))
                            .collect(),
                    )
                })
                .collect(),
            StoreStage::Group(key) => group(items, key),
        };
    }

    items.into_iter().map(Item::into_row).collect()
}

fn order(items: Vec<Item>, keys: &[(StoreExpr, Direction)]) -> Vec<Item> {
    let mut keyed: Vec<(Vec<Value>, Item)> = items
        .into_iter()
        .map(|item| {
            let values = keys.iter().map(|(expr, _)| expr.eval(item.view())).collect();
            (values, item)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        a.iter()
            .zip(b)
            .zip(keys)
            .map(|((a, b), (_, direction))| match direction {
                Direction::Asc => sort_cmp(a, b),
                Direction::Desc => sort_cmp(b, a),
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}

fn group(items: Vec<Item>, key: &StoreExpr) -> Vec<Item> {
    let mut keyed: Vec<(Value, Item)> = items
        .into_iter()
        .map(|item| (key.eval(item.view()), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| sort_cmp(a, b));

    let mut groups: Vec<Item> = Vec::new();
    for (key, item) in keyed {
        let member = item.into_row();
        match groups.last_mut() {
            Some(Item::Group {
                key: current,
                members,
            }) if sort_cmp(current, &key) == Ordering::Equal => members.push(member),
            _ => groups.push(Item::Group {
                key,
                members: vec![member],
            }),
        }
    }

    groups
}
