//! Metrics sink boundary.
//!
//! Engine code never touches counters directly. All instrumentation flows
//! through `MetricsEvent` and the process-wide sink.

use crate::{
    error::ErrorClass,
    obs::metrics::{EventMetrics, EventReport},
};
use std::sync::LazyLock;

static GLOBAL_METRICS: LazyLock<EventMetrics> = LazyLock::new(EventMetrics::new);

///
/// PlanKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlanKind {
    FullScan,
    Index,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Plan {
        kind: PlanKind,
    },
    FetchFinish {
        rows_visited: u64,
        rows_matched: u64,
        exhausted: bool,
    },
    FetchFailed {
        class: ErrorClass,
    },
    PageApplied {
        rows: u64,
    },
    StaleDiscarded,
    SeedBatch {
        rows: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// Route one event to the process-wide sink.
pub(crate) fn record(event: MetricsEvent) {
    GLOBAL_METRICS.record(event);
}

/// Snapshot of the process-wide counters.
#[must_use]
pub fn metrics_report() -> EventReport {
    GLOBAL_METRICS.report()
}

/// Reset the process-wide counters.
pub fn metrics_reset_all() {
    GLOBAL_METRICS.reset();
}
