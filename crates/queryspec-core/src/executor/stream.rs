//! Stream phase: lazy adaptors over `Result<Element<T>, QueryError>`.
//!
//! Skip and take count successful elements only; errors pass through
//! untouched so the outer stream can surface and fuse on them.
use crate::{
    error::QueryError,
    executor::{
        bind::{BoundExpr, BoundPredicate, Slot, Stage},
        element::{Element, Group},
    },
    model::Row,
    obs::sink::{MetricsEvent, record},
    query::sort::Direction,
    value::{Value, sort_cmp},
};
use std::{cmp::Ordering, vec};
use tracing::trace;

pub(crate) type ElementStream<'a, T> = Box<dyn Iterator<Item = Result<Element<T>, QueryError>> + 'a>;

/// Chain bound stages over a source stream, in order.
pub(crate) fn assemble<'a, T: 'a>(
    source: ElementStream<'a, T>,
    stages: Vec<Stage<T>>,
) -> ElementStream<'a, T> {
    stages
        .into_iter()
        .fold(source, |upstream, stage| match stage {
            Stage::Filter(predicate) => Box::new(FilterStage {
                upstream,
                predicate,
            }),
            Stage::GroupBy(key) => Box::new(Buffered::new(upstream, move |items| {
                group_elements(items, &key)
            })),
            Stage::Project(fields) => Box::new(upstream.map(move |item| {
                item.and_then(|element| project(&element, &fields).map(Element::Row))
            })),
            Stage::Skip(n) => Box::new(SkipStage {
                upstream,
                remaining: n,
            }),
            Stage::Sort(keys) => Box::new(Buffered::new(upstream, move |items| {
                sort_elements(items, &keys)
            })),
            Stage::Take(n) => Box::new(TakeStage {
                upstream,
                remaining: n,
            }),
        })
}

///
/// FilterStage
///

struct FilterStage<'a, T> {
    upstream: ElementStream<'a, T>,
    predicate: BoundPredicate<T>,
}

impl<T> Iterator for FilterStage<'_, T> {
    type Item = Result<Element<T>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.upstream.next()? {
                Ok(element) => match self.predicate.eval(&element) {
                    Ok(truth) if truth.is_true() => return Some(Ok(element)),
                    Ok(_) => {}
                    Err(err) => return Some(Err(err)),
                },
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

///
/// SkipStage
///

struct SkipStage<'a, T> {
    upstream: ElementStream<'a, T>,
    remaining: u64,
}

impl<T> Iterator for SkipStage<'_, T> {
    type Item = Result<Element<T>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.upstream.next()?;
            if item.is_ok() && self.remaining > 0 {
                self.remaining -= 1;
                continue;
            }
            return Some(item);
        }
    }
}

///
/// TakeStage
///

struct TakeStage<'a, T> {
    upstream: ElementStream<'a, T>,
    remaining: u64,
}

impl<T> Iterator for TakeStage<'_, T> {
    type Item = Result<Element<T>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = self.upstream.next()?;
        if item.is_ok() {
            self.remaining -= 1;
        }

        Some(item)
    }
}

///
/// Buffered
///
/// Drains its upstream on first pull, then replays the transformed buffer.
/// An upstream error short-circuits the buffer and is emitted alone.
///

type BufferFn<'a, T> =
    Box<dyn FnOnce(Vec<Element<T>>) -> Result<Vec<Element<T>>, QueryError> + 'a>;

enum Buffered<'a, T> {
    Pending {
        upstream: ElementStream<'a, T>,
        transform: BufferFn<'a, T>,
    },
    Ready(vec::IntoIter<Element<T>>),
    Done,
}

impl<'a, T> Buffered<'a, T> {
    fn new(
        upstream: ElementStream<'a, T>,
        transform: impl FnOnce(Vec<Element<T>>) -> Result<Vec<Element<T>>, QueryError> + 'a,
    ) -> Self {
        Self::Pending {
            upstream,
            transform: Box::new(transform),
        }
    }
}

impl<T> Iterator for Buffered<'_, T> {
    type Item = Result<Element<T>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Self::Ready(items) = self {
            return items.next().map(Ok);
        }

        match std::mem::replace(self, Self::Done) {
            Self::Pending {
                upstream,
                transform,
            } => {
                let drained = match upstream.collect::<Result<Vec<_>, _>>() {
                    Ok(items) => items,
                    Err(err) => return Some(Err(err)),
                };
                trace!(buffered = drained.len(), "buffered stage drained upstream");
                record(MetricsEvent::RowsBuffered {
                    rows: u64::try_from(drained.len()).unwrap_or(u64::MAX),
                });

                match transform(drained) {
                    Ok(items) => {
                        let mut items = items.into_iter();
                        let first = items.next();
                        *self = Self::Ready(items);
                        first.map(Ok)
                    }
                    Err(err) => Some(Err(err)),
                }
            }
            Self::Ready(_) | Self::Done => None,
        }
    }
}

/// Stable multi-key sort; nulls first ascending, last descending.
fn sort_elements<T>(
    items: Vec<Element<T>>,
    keys: &[(Slot<T>, Direction)],
) -> Result<Vec<Element<T>>, QueryError> {
    let mut keyed = items
        .into_iter()
        .map(|element| {
            let values = keys
                .iter()
                .map(|(slot, _)| slot.read(&element))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((values, element))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, keys.iter().map(|(_, dir)| *dir)));

    Ok(keyed.into_iter().map(|(_, element)| element).collect())
}

pub(crate) fn compare_keys(
    a: &[Value],
    b: &[Value],
    directions: impl Iterator<Item = Direction>,
) -> Ordering {
    for ((a, b), direction) in a.iter().zip(b).zip(directions) {
        let ord = sort_cmp(a, b);
        let ord = if direction.is_desc() { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// Group by key; groups come out in ascending key order, items keep
/// their relative order, and the first-seen key represents equal keys.
fn group_elements<T>(
    items: Vec<Element<T>>,
    key: &BoundExpr<T>,
) -> Result<Vec<Element<T>>, QueryError> {
    let mut keyed = items
        .into_iter()
        .map(|element| Ok((key.eval(&element)?, element)))
        .collect::<Result<Vec<_>, QueryError>>()?;

    keyed.sort_by(|(a, _), (b, _)| sort_cmp(a, b));

    let mut groups: Vec<(Value, Vec<Element<T>>)> = Vec::new();
    for (key, element) in keyed {
        match groups.last_mut() {
            Some((current, members)) if sort_cmp(current, &key) == Ordering::Equal => {
                members.push(element);
            }
            _ => groups.push((key, vec![element])),
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, members)| Element::Group(Group::new(key, members)))
        .collect())
}

fn project<T>(element: &Element<T>, fields: &[(String, BoundExpr<T>)]) -> Result<Row, QueryError> {
    let mut row = Row::new();
    for (name, expr) in fields {
        row.set(name.as_str(), expr.eval(element)?);
    }

    Ok(row)
}
