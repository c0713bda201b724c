//! Observability: per-thread query counters and the sink they flow through.
//!
//! Engines never touch `metrics` directly; they emit `MetricsEvent`s via
//! `sink::record`. Structured logs go through `tracing` at the call sites.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, ShapeCounters, ShapeSummary};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
