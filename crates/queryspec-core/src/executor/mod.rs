//! In-memory execution engine.
//!
//! `apply_query` binds a spec against the record type once, then streams the
//! source through lazy stages. Sort and group stages buffer; every other
//! stage pulls one element at a time.

pub(crate) mod aggregate;
mod bind;
mod element;
mod stream;


use crate::{
    error::{InternalError, QueryError},
    model::Row,
    obs::sink::Span,
    query::QuerySpec,
    traits::{AppliesTo, Record},
};
use std::iter::FusedIterator;
use stream::ElementStream;
use tracing::{debug, instrument};

// re-exports
pub use element::{Element, Group};

/// Apply `spec` to an in-memory sequence.
///
/// Path resolution happens here, before the first element is read; an
/// unknown path fails the call rather than the iteration. Open shapes
/// resolve per element and fail on the first element missing the path.
#[instrument(
    level = "debug",
    skip_all,
    fields(shape = T::shape().name(), operations = spec.len())
)]
pub fn apply_query<'a, T, S, I>(
    source: I,
    spec: &QuerySpec<S>,
) -> Result<QueryResults<'a, T>, QueryError>
where
    T: Record,
    S: AppliesTo<T>,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'a,
{
    let stages = bind::bind_plan::<T>(&spec.operations())?;
    debug!(stages = stages.len(), "streaming query");

    let source: ElementStream<'a, T> =
        Box::new(source.into_iter().map(|record| Ok(Element::Record(record))));

    Ok(QueryResults {
        inner: stream::assemble(source, stages),
        span: Span::new(T::shape().name()),
        done: false,
    })
}

///
/// QueryResults
///
/// Lazy result stream of one `apply_query` call. Yields at most one error,
/// after which it is exhausted.
///

pub struct QueryResults<'a, T> {
    inner: ElementStream<'a, T>,
    span: Span,
    done: bool,
}

impl<T> QueryResults<'_, T> {
    /// Drain into elements, stopping at the first error.
    pub fn elements(self) -> Result<Vec<Element<T>>, QueryError> {
        self.collect()
    }

    /// Drain into source records; fails if the spec reshaped the elements.
    pub fn records(self) -> Result<Vec<T>, QueryError> {
        self.map(|item| {
            item.and_then(|element| match element {
                Element::Record(record) => Ok(record),
                other => Err(InternalError::executor_invariant(format!(
                    "expected record element, found {}",
                    other.kind()
                ))
                .into()),
            })
        })
        .collect()
    }
}

impl<T: Record> QueryResults<'_, T> {
    /// Drain into dynamic rows; groups flatten to `{key, count}`.
    pub fn rows(self) -> Result<Vec<Row>, QueryError> {
        self.map(|item| item.map(|element| element.to_row()))
            .collect()
    }
}

impl<T> Iterator for QueryResults<'_, T> {
    type Item = Result<Element<T>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.inner.next() {
            Some(Ok(element)) => {
                self.span.add_row();
                Some(Ok(element))
            }
            Some(Err(err)) => {
                debug!(error = %err, "query stream failed");
                self.span.fail();
                self.done = true;
                Some(Err(err))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<T> FusedIterator for QueryResults<'_, T> {}
