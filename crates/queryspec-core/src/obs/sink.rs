//! Metrics sink boundary.
//!
//! Engine code MUST NOT depend on `obs::metrics` directly.
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    QueryStart {
        shape: &'static str,
    },
    QueryFinish {
        shape: &'static str,
        rows_emitted: u64,
        failed: bool,
    },
    RowsBuffered {
        rows: u64,
    },
    Translated {
        provider: &'static str,
        operations: u64,
    },
    TranslationRejected {
        provider: &'static str,
    },
    TableExecuted {
        rows: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default sink writing into the thread-local counter state.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::QueryStart { shape } => metrics::with_state_mut(|m| {
                m.ops.memory_queries = m.ops.memory_queries.saturating_add(1);
                let entry = m.shapes.entry(shape.to_string()).or_default();
                entry.queries = entry.queries.saturating_add(1);
            }),

            MetricsEvent::QueryFinish {
                shape,
                rows_emitted,
                failed,
            } => metrics::with_state_mut(|m| {
                m.ops.rows_emitted = m.ops.rows_emitted.saturating_add(rows_emitted);
                let entry = m.shapes.entry(shape.to_string()).or_default();
                entry.rows_emitted = entry.rows_emitted.saturating_add(rows_emitted);
                if failed {
                    m.ops.query_errors = m.ops.query_errors.saturating_add(1);
                    entry.query_errors = entry.query_errors.saturating_add(1);
                }
            }),

            MetricsEvent::RowsBuffered { rows } => metrics::with_state_mut(|m| {
                m.ops.rows_buffered = m.ops.rows_buffered.saturating_add(rows);
            }),

            MetricsEvent::Translated { operations, .. } => metrics::with_state_mut(|m| {
                m.ops.translations = m.ops.translations.saturating_add(1);
                m.ops.operations_translated =
                    m.ops.operations_translated.saturating_add(operations);
            }),

            MetricsEvent::TranslationRejected { .. } => metrics::with_state_mut(|m| {
                m.ops.translations_rejected = m.ops.translations_rejected.saturating_add(1);
            }),

            MetricsEvent::TableExecuted { rows } => metrics::with_state_mut(|m| {
                m.ops.table_executions = m.ops.table_executions.saturating_add(1);
                m.ops.table_rows = m.ops.table_rows.saturating_add(rows);
            }),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    // clone out of the slot so a sink may itself record without re-borrowing
    let active = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match active {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
/// The previous sink is restored on every exit, including unwind.
pub fn with_metrics_sink<R>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> R) -> R {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = prev);
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard emitting start/finish events for one in-memory query.
/// Finish accounting happens on drop, including unwind.
///

pub(crate) struct Span {
    shape: &'static str,
    rows: u64,
    failed: bool,
}

impl Span {
    #[must_use]
    pub(crate) fn new(shape: &'static str) -> Self {
        record(MetricsEvent::QueryStart { shape });

        Self {
            shape,
            rows: 0,
            failed: false,
        }
    }

    pub(crate) const fn add_row(&mut self) {
        self.rows = self.rows.saturating_add(1);
    }

    pub(crate) const fn fail(&mut self) {
        self.failed = true;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::QueryFinish {
            shape: self.shape,
            rows_emitted: self.rows,
            failed: self.failed,
        });
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::Cell,
        panic::{AssertUnwindSafe, catch_unwind},
    };

    #[derive(Default)]
    struct CountingSink {
        calls: Cell<usize>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn rejected() -> MetricsEvent {
        MetricsEvent::TranslationRejected { provider: "sql" }
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        let outer = Rc::new(CountingSink::default());
        let inner = Rc::new(CountingSink::default());

        record(rejected());
        assert_eq!(outer.calls.get(), 0);

        with_metrics_sink(outer.clone(), || {
            record(rejected());
            with_metrics_sink(inner.clone(), || record(rejected()));
            record(rejected());
        });

        assert_eq!(outer.calls.get(), 2);
        assert_eq!(inner.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        let sink = Rc::new(CountingSink::default());

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || {
                record(rejected());
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();

        assert!(panicked);
        assert_eq!(sink.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn span_accounts_rows_and_failures_per_shape() {
        metrics_reset_all();
        {
            let mut span = Span::new("Person");
            span.add_row();
            span.add_row();
        }
        {
            let mut span = Span::new("Person");
            span.fail();
        }

        let counters = metrics_report(None).counters.expect("counters present");
        assert_eq!(counters.ops.memory_queries, 2);
        assert_eq!(counters.ops.rows_emitted, 2);
        assert_eq!(counters.ops.query_errors, 1);

        let person = counters.shapes.get("Person").expect("shape counters");
        assert_eq!(person.queries, 2);
        assert_eq!(person.query_errors, 1);
    }

    #[test]
    fn translation_events_accumulate() {
        metrics_reset_all();
        record(MetricsEvent::Translated {
            provider: "table",
            operations: 3,
        });
        record(rejected());
        record(MetricsEvent::TableExecuted { rows: 4 });

        let ops = metrics_report(None).counters.expect("counters present").ops;
        assert_eq!(ops.translations, 1);
        assert_eq!(ops.operations_translated, 3);
        assert_eq!(ops.translations_rejected, 1);
        assert_eq!(ops.table_executions, 1);
        assert_eq!(ops.table_rows, 4);
    }
}
