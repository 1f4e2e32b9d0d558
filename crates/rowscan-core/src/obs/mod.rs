//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Logs go through `tracing`; this module only carries counters.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventMetrics, EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, PlanKind, metrics_report, metrics_reset_all};
