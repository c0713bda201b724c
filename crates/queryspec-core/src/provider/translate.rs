use crate::{
    error::{BuildError, QueryError},
    model::FieldKind,
    obs::sink::{MetricsEvent, record},
    provider::{Column, Member, QueryProvider},
    query::{
        AggregateFunc, CompareOp, ComparePredicate, CustomPredicate, Expr, Operation, Predicate,
        QuerySpec,
        operation::clamp_count,
        predicate::{
            normalize,
            validate::{check_pattern, coerce_flag, coerce_literal},
        },
    },
    traits::SpecTarget,
    value::Value,
};
use tracing::{debug, instrument};

/// Translate `spec` into a native query rooted at `root`.
///
/// Operations are applied in append order. Paths bind through the
/// provider's `member` lookup; named-path literals are coerced to the
/// member kind exactly as the in-memory engine coerces them.
#[instrument(
    level = "debug",
    skip_all,
    fields(provider = provider.name(), operations = spec.len())
)]
pub fn apply_data_query<P, S>(
    provider: &P,
    root: P::Query,
    spec: &QuerySpec<S>,
) -> Result<P::Query, QueryError>
where
    P: QueryProvider,
    S: SpecTarget,
{
    let ops = spec.operations();

    match translate_operations(provider, root, &ops) {
        Ok(query) => {
            record(MetricsEvent::Translated {
                provider: provider.name(),
                operations: u64::try_from(ops.len()).unwrap_or(u64::MAX),
            });
            Ok(query)
        }
        Err(err) => {
            debug!(error = %err, "translation rejected");
            record(MetricsEvent::TranslationRejected {
                provider: provider.name(),
            });
            Err(err)
        }
    }
}

fn translate_operations<P: QueryProvider>(
    provider: &P,
    root: P::Query,
    ops: &[&Operation],
) -> Result<P::Query, QueryError> {
    let mut query = root;

    for op in ops {
        query = match op {
            Operation::Filter(predicate) => {
                let predicate = predicate_expr(provider, &query, &normalize(predicate))?;
                provider.filter(query, predicate)?
            }
            Operation::Sort(keys) => {
                let keys = keys
                    .iter()
                    .map(|key| -> Result<_, QueryError> {
                        Ok((provider.member(&query, &key.path)?.expr, key.direction))
                    })
                    .collect::<Result<Vec<_>, QueryError>>()?;
                provider.order_by(query, keys)?
            }
            Operation::Skip(count) => provider.skip(query, count.resolve())?,
            Operation::Take(n) => provider.take(query, clamp_count(*n))?,
            Operation::Project(projection) => {
                let columns = projection
                    .fields()
                    .iter()
                    .map(|(name, expr)| -> Result<_, QueryError> {
                        let member = value_expr(provider, &query, expr)?;
                        Ok(Column {
                            name: name.clone(),
                            expr: member.expr,
                            kind: member.kind,
                        })
                    })
                    .collect::<Result<Vec<_>, QueryError>>()?;
                provider.project(query, columns)?
            }
            Operation::GroupBy(key) => {
                let key = value_expr(provider, &query, key)?;
                provider.group_by(query, key.expr, key.kind)?
            }
        };
        debug!(operation = op.name(), "translated operation");
    }

    Ok(query)
}

fn value_expr<P: QueryProvider>(
    provider: &P,
    query: &P::Query,
    expr: &Expr,
) -> Result<Member<P::Expr>, QueryError> {
    match expr {
        Expr::Field(path) => provider.member(query, path),
        Expr::Literal(value) => Ok(Member::new(
            provider.literal(value.clone())?,
            FieldKind::of_value(value),
        )),
        Expr::Aggregate { func, field } => {
            let arg = field
                .as_ref()
                .map(|path| provider.group_member(query, path))
                .transpose()?;
            let kind = match (func, &arg) {
                (AggregateFunc::Count, _) | (_, None) => FieldKind::Int,
                (_, Some(member)) => member.kind,
            };

            Ok(Member::new(
                provider.aggregate(*func, arg.map(|member| member.expr))?,
                kind,
            ))
        }
    }
}

fn predicate_expr<P: QueryProvider>(
    provider: &P,
    query: &P::Query,
    predicate: &Predicate,
) -> Result<P::Expr, QueryError> {
    let all = |children: &[Predicate]| {
        children
            .iter()
            .map(|child| predicate_expr(provider, query, child))
            .collect::<Result<Vec<_>, _>>()
    };

    match predicate {
        Predicate::True => provider.constant(true),
        Predicate::False => provider.constant(false),
        Predicate::And(children) => provider.and(all(children)?),
        Predicate::Or(children) => provider.or(all(children)?),
        Predicate::Not(inner) => provider.not(predicate_expr(provider, query, inner)?),
        Predicate::Compare(ComparePredicate { path, op, value }) => {
            let member = provider.member(query, path)?;
            let value = coerce_literal(path, member.kind, value)?;
            compare_expr(provider, *op, member.expr, value)
        }
        Predicate::Custom(custom) => {
            let member = provider.member(query, custom.path())?;
            custom_expr(provider, custom, member)
        }
    }
}

/// Null literals turn `Eq` / `Ne` into null tests; every other operator
/// against null stays a native (unknown) comparison.
fn compare_expr<P: QueryProvider>(
    provider: &P,
    op: CompareOp,
    target: P::Expr,
    value: Value,
) -> Result<P::Expr, QueryError> {
    match (op, value.is_null()) {
        (CompareOp::Eq, true) => provider.is_null(target, false),
        (CompareOp::Ne, true) => provider.is_null(target, true),
        _ => provider.compare(op, target, provider.literal(value)?),
    }
}

fn custom_expr<P: QueryProvider>(
    provider: &P,
    custom: &CustomPredicate,
    member: Member<P::Expr>,
) -> Result<P::Expr, QueryError> {
    let Member { expr, kind } = member;

    match custom {
        CustomPredicate::IsBetween {
            path,
            min,
            max,
            include_max,
        } => {
            let min = provider.literal(coerce_literal(path, kind, min)?)?;
            let max = provider.literal(coerce_literal(path, kind, max)?)?;
            let upper = if *include_max {
                CompareOp::Lte
            } else {
                CompareOp::Lt
            };

            provider.and(vec![
                provider.compare(CompareOp::Gte, expr.clone(), min)?,
                provider.compare(upper, expr, max)?,
            ])
        }
        CustomPredicate::HasFlag { path, flag } => {
            let flag = provider.literal(coerce_flag(path, kind, flag)?)?;
            let masked = provider.bit_and(expr, flag.clone())?;

            provider.compare(CompareOp::Eq, masked, flag)
        }
        CustomPredicate::IsIn { path, items } => {
            let coerced = items
                .iter()
                .map(|item| coerce_literal(path, kind, item))
                .collect::<Result<Vec<_>, BuildError>>()?;
            in_set_expr(provider, expr, coerced)
        }
        CustomPredicate::Like { path, pattern } => {
            check_pattern(path, kind)?;
            provider.like(expr, pattern)
        }
    }
}

/// Empty sets are native `false`; a null item becomes an `OR IS NULL` arm.
fn in_set_expr<P: QueryProvider>(
    provider: &P,
    target: P::Expr,
    items: Vec<Value>,
) -> Result<P::Expr, QueryError> {
    if items.is_empty() {
        return provider.constant(false);
    }

    let has_null = items.iter().any(Value::is_null);
    let values = items
        .into_iter()
        .filter(|item| !item.is_null())
        .map(|item| provider.literal(item))
        .collect::<Result<Vec<_>, _>>()?;

    match (values.is_empty(), has_null) {
        (true, _) => provider.is_null(target, false),
        (false, false) => provider.in_set(target, values),
        (false, true) => provider.or(vec![
            provider.in_set(target.clone(), values)?,
            provider.is_null(target, false)?,
        ]),
    }
}
