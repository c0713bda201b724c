use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters for query execution and translation.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub shapes: BTreeMap<String, ShapeCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            shapes: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // In-memory engine
    pub memory_queries: u64,
    pub rows_emitted: u64,
    pub rows_buffered: u64,
    pub query_errors: u64,

    // Remote translation
    pub translations: u64,
    pub operations_translated: u64,
    pub translations_rejected: u64,

    // Table provider
    pub table_executions: u64,
    pub table_rows: u64,
}

///
/// ShapeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShapeCounters {
    pub queries: u64,
    pub rows_emitted: u64,
    pub query_errors: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Counters since `window_start_ms`; `None` when the requested window
    /// starts after the current one.
    pub counters: Option<EventState>,
    pub shape_counters: Vec<ShapeSummary>,
}

///
/// ShapeSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShapeSummary {
    pub shape: String,
    pub queries: u64,
    pub rows_emitted: u64,
    pub query_errors: u64,
    pub avg_rows_per_query: f64,
}

/// Build a report, optionally filtered by window start.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| start > snap.window_start_ms) {
        return EventReport::default();
    }

    let mut shape_counters: Vec<ShapeSummary> = snap
        .shapes
        .iter()
        .map(|(shape, c)| ShapeSummary {
            shape: shape.clone(),
            queries: c.queries,
            rows_emitted: c.rows_emitted,
            query_errors: c.query_errors,
            avg_rows_per_query: if c.queries > 0 {
                c.rows_emitted as f64 / c.queries as f64
            } else {
                0.0
            },
        })
        .collect();

    shape_counters.sort_by(|a, b| {
        b.avg_rows_per_query
            .partial_cmp(&a.avg_rows_per_query)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.rows_emitted.cmp(&a.rows_emitted))
            .then_with(|| a.shape.cmp(&b.shape))
    });

    EventReport {
        counters: Some(snap),
        shape_counters,
    }
}

///
/// TESTS
///
