//! Bind phase: resolve every path of a spec to a slot once, before any
//! element is read.
use crate::{
    error::{BuildError, InternalError, PathNotFoundError, QueryError},
    executor::{
        aggregate,
        element::{Element, Group},
    },
    model::{Accessor, FieldKind, OpenResolver},
    query::{
        expr::{AggregateFunc, Expr},
        operation::{Operation, clamp_count},
        path::FieldPath,
        predicate::{
            CompareOp, ComparePredicate, CustomPredicate, LikePattern, Predicate, eval, normalize,
            validate::{check_pattern, coerce_flag, coerce_literal},
        },
        sort::Direction,
    },
    traits::Record,
    value::{Truth, Value},
};
use tracing::debug;

///
/// Slot
/// A resolved read position for one path against one element kind.
///

pub(crate) enum Slot<T> {
    Accessor(Accessor<T>),
    Column(usize),
    GroupCount,
    GroupKey,
    Open {
        path: String,
        resolve: OpenResolver<T>,
        shape: &'static str,
    },
}

impl<T> Slot<T> {
    pub(crate) fn read(&self, element: &Element<T>) -> Result<Value, QueryError> {
        match (self, element) {
            (Self::Accessor(read), Element::Record(record)) => Ok(read(record)),
            (
                Self::Open {
                    path,
                    resolve,
                    shape,
                },
                Element::Record(record),
            ) => resolve(record, path)
                .ok_or_else(|| PathNotFoundError::executor(path.as_str(), *shape).into()),
            (Self::Column(index), Element::Row(row)) => row.value_at(*index).cloned().ok_or_else(|| {
                InternalError::executor_invariant(format!("projected column {index} missing"))
                    .into()
            }),
            (Self::GroupKey, Element::Group(group)) => Ok(group.key().clone()),
            (Self::GroupCount, Element::Group(group)) => Ok(group.count_value()),
            (_, other) => Err(InternalError::executor_invariant(format!(
                "slot does not apply to {} element",
                other.kind()
            ))
            .into()),
        }
    }
}

///
/// BindScope
/// What the elements look like at one point of the pipeline.
///

enum BindScope {
    Source,
    Projected(Vec<(String, FieldKind)>),
    Grouped { key: FieldKind, items: Box<Self> },
}

impl BindScope {
    fn resolve<T: Record>(&self, path: &FieldPath) -> Result<(Slot<T>, FieldKind), QueryError> {
        let dotted = path.dotted();

        match self {
            Self::Source => {
                let shape = T::shape();
                if let Some(field) = shape.field(&dotted) {
                    return Ok((Slot::Accessor(field.accessor()), field.model().kind));
                }
                match shape.open_resolver() {
                    Some(resolve) => Ok((
                        Slot::Open {
                            path: dotted,
                            resolve,
                            shape: shape.name(),
                        },
                        FieldKind::Any,
                    )),
                    None => Err(PathNotFoundError::executor(dotted, shape.name()).into()),
                }
            }
            Self::Projected(columns) => columns
                .iter()
                .position(|(name, _)| *name == dotted)
                .map(|index| (Slot::Column(index), columns[index].1))
                .ok_or_else(|| PathNotFoundError::executor(dotted, "projection").into()),
            Self::Grouped { key, .. } => match dotted.as_str() {
                "key" => Ok((Slot::GroupKey, *key)),
                "count" => Ok((Slot::GroupCount, FieldKind::Int)),
                _ => Err(PathNotFoundError::executor(dotted, "group").into()),
            },
        }
    }
}

///
/// BoundPredicate
///

pub(crate) enum BoundPredicate<T> {
    And(Vec<Self>),
    Between {
        slot: Slot<T>,
        min: Value,
        max: Value,
        include_max: bool,
    },
    Compare {
        slot: Slot<T>,
        op: CompareOp,
        value: Value,
    },
    Const(bool),
    Flag {
        slot: Slot<T>,
        flag: Value,
    },
    In {
        slot: Slot<T>,
        items: Vec<Value>,
    },
    Like {
        slot: Slot<T>,
        pattern: LikePattern,
    },
    Not(Box<Self>),
    Or(Vec<Self>),
}

impl<T> BoundPredicate<T> {
    /// Three-valued evaluation with short-circuiting junctions.
    pub(crate) fn eval(&self, element: &Element<T>) -> Result<Truth, QueryError> {
        Ok(match self {
            Self::And(children) => {
                let mut acc = Truth::True;
                for child in children {
                    acc = acc.and(child.eval(element)?);
                    if acc == Truth::False {
                        break;
                    }
                }
                acc
            }
            Self::Or(children) => {
                let mut acc = Truth::False;
                for child in children {
                    acc = acc.or(child.eval(element)?);
                    if acc == Truth::True {
                        break;
                    }
                }
                acc
            }
            Self::Not(inner) => !inner.eval(element)?,
            Self::Const(b) => Truth::from_bool(*b),
            Self::Compare { slot, op, value } => eval::compare(*op, &slot.read(element)?, value),
            Self::Between {
                slot,
                min,
                max,
                include_max,
            } => eval::between(&slot.read(element)?, min, max, *include_max),
            Self::In { slot, items } => {
                // empty sets never match and never read the field
                if items.is_empty() {
                    Truth::False
                } else {
                    eval::in_set(&slot.read(element)?, items)
                }
            }
            Self::Flag { slot, flag } => eval::has_flag(&slot.read(element)?, flag),
            Self::Like { slot, pattern } => eval::like(&slot.read(element)?, pattern),
        })
    }
}

///
/// BoundExpr
///

pub(crate) enum BoundExpr<T> {
    Aggregate {
        func: AggregateFunc,
        slot: Option<Slot<T>>,
    },
    Field(Slot<T>),
    Literal(Value),
}

impl<T> BoundExpr<T> {
    pub(crate) fn eval(&self, element: &Element<T>) -> Result<Value, QueryError> {
        match self {
            Self::Field(slot) => slot.read(element),
            Self::Literal(value) => Ok(value.clone()),
            Self::Aggregate { func, slot } => {
                let Element::Group(group) = element else {
                    return Err(InternalError::executor_invariant(
                        "aggregate evaluated outside a group",
                    )
                    .into());
                };
                aggregate_group(*func, slot.as_ref(), group)
            }
        }
    }
}

fn aggregate_group<T>(
    func: AggregateFunc,
    slot: Option<&Slot<T>>,
    group: &Group<T>,
) -> Result<Value, QueryError> {
    let Some(slot) = slot else {
        return Ok(group.count_value());
    };

    let values = group
        .items()
        .iter()
        .map(|item| slot.read(item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(aggregate::fold(func, values))
}

///
/// Stage
/// One bound pipeline step.
///

pub(crate) enum Stage<T> {
    Filter(BoundPredicate<T>),
    GroupBy(BoundExpr<T>),
    Project(Vec<(String, BoundExpr<T>)>),
    Skip(u64),
    Sort(Vec<(Slot<T>, Direction)>),
    Take(u64),
}

/// Bind every operation against `T`'s shape and the scopes it produces.
pub(crate) fn bind_plan<T: Record>(ops: &[&Operation]) -> Result<Vec<Stage<T>>, QueryError> {
    let mut scope = BindScope::Source;
    let mut stages = Vec::with_capacity(ops.len());

    for op in ops {
        let stage = match op {
            Operation::Filter(predicate) => {
                Stage::Filter(bind_predicate(&normalize(predicate), &scope)?)
            }
            Operation::Sort(keys) => Stage::Sort(
                keys.iter()
                    .map(|key| -> Result<_, QueryError> {
                        Ok((scope.resolve::<T>(&key.path)?.0, key.direction))
                    })
                    .collect::<Result<_, QueryError>>()?,
            ),
            Operation::Skip(count) => Stage::Skip(count.resolve()),
            Operation::Take(n) => Stage::Take(clamp_count(*n)),
            Operation::Project(projection) => {
                let mut bound = Vec::with_capacity(projection.fields().len());
                let mut columns = Vec::with_capacity(projection.fields().len());
                for (name, expr) in projection.fields() {
                    let (expr, kind) = bind_expr::<T>(expr, &scope)?;
                    bound.push((name.clone(), expr));
                    columns.push((name.clone(), kind));
                }
                scope = BindScope::Projected(columns);
                Stage::Project(bound)
            }
            Operation::GroupBy(key) => {
                let (expr, kind) = bind_expr::<T>(key, &scope)?;
                scope = BindScope::Grouped {
                    key: kind,
                    items: Box::new(scope),
                };
                Stage::GroupBy(expr)
            }
        };
        stages.push(stage);
    }

    debug!(shape = T::shape().name(), stages = stages.len(), "bound query plan");

    Ok(stages)
}

fn bind_expr<T: Record>(
    expr: &Expr,
    scope: &BindScope,
) -> Result<(BoundExpr<T>, FieldKind), QueryError> {
    match expr {
        Expr::Field(path) => {
            let (slot, kind) = scope.resolve(path)?;
            Ok((BoundExpr::Field(slot), kind))
        }
        Expr::Literal(value) => Ok((
            BoundExpr::Literal(value.clone()),
            FieldKind::of_value(value),
        )),
        Expr::Aggregate { func, field } => {
            let BindScope::Grouped { items, .. } = scope else {
                return Err(BuildError::AggregateOutsideGroup.into());
            };
            let (slot, kind) = match field {
                Some(path) => {
                    let (slot, kind) = items.resolve(path)?;
                    (Some(slot), kind)
                }
                None => (None, FieldKind::Int),
            };
            let kind = if *func == AggregateFunc::Count {
                FieldKind::Int
            } else {
                kind
            };

            Ok((BoundExpr::Aggregate { func: *func, slot }, kind))
        }
    }
}

fn bind_predicate<T: Record>(
    predicate: &Predicate,
    scope: &BindScope,
) -> Result<BoundPredicate<T>, QueryError> {
    let bind_all = |children: &[Predicate]| {
        children
            .iter()
            .map(|child| bind_predicate(child, scope))
            .collect::<Result<Vec<_>, _>>()
    };

    Ok(match predicate {
        Predicate::True => BoundPredicate::Const(true),
        Predicate::False => BoundPredicate::Const(false),
        Predicate::And(children) => BoundPredicate::And(bind_all(children)?),
        Predicate::Or(children) => BoundPredicate::Or(bind_all(children)?),
        Predicate::Not(inner) => BoundPredicate::Not(Box::new(bind_predicate(inner, scope)?)),
        Predicate::Compare(ComparePredicate { path, op, value }) => {
            let (slot, kind) = scope.resolve(path)?;
            BoundPredicate::Compare {
                slot,
                op: *op,
                value: coerce_literal(path, kind, value)?,
            }
        }
        Predicate::Custom(custom) => {
            let (slot, kind) = scope.resolve(custom.path())?;
            bind_custom(custom, slot, kind)?
        }
    })
}

fn bind_custom<T>(
    custom: &CustomPredicate,
    slot: Slot<T>,
    kind: FieldKind,
) -> Result<BoundPredicate<T>, QueryError> {
    Ok(match custom {
        CustomPredicate::IsBetween {
            path,
            min,
            max,
            include_max,
        } => BoundPredicate::Between {
            slot,
            min: coerce_literal(path, kind, min)?,
            max: coerce_literal(path, kind, max)?,
            include_max: *include_max,
        },
        CustomPredicate::HasFlag { path, flag } => BoundPredicate::Flag {
            slot,
            flag: coerce_flag(path, kind, flag)?,
        },
        CustomPredicate::IsIn { path, items } => BoundPredicate::In {
            slot,
            items: items
                .iter()
                .map(|item| coerce_literal(path, kind, item))
                .collect::<Result<_, _>>()?,
        },
        CustomPredicate::Like { path, pattern } => {
            check_pattern(path, kind)?;
            BoundPredicate::Like {
                slot,
                pattern: LikePattern::compile(pattern),
            }
        }
    })
}
