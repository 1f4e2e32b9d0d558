use crate::{
    error::ErrorClass,
    obs::sink::{MetricsEvent, MetricsSink, PlanKind},
    types::Timestamp,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

///
/// EventOps
/// Saturating counters for engine operations.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Planner kinds
    pub plan_full_scan: u64,
    pub plan_index: u64,

    // Fetches
    pub fetch_calls: u64,
    pub fetch_exhausted: u64,
    pub fetch_access_failures: u64,
    pub fetch_fatal_failures: u64,
    pub rows_visited: u64,
    pub rows_matched: u64,

    // Session
    pub pages_applied: u64,
    pub rows_applied: u64,
    pub stale_discards: u64,

    // Seeding
    pub seed_batches: u64,
    pub seed_rows: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub since: Timestamp,
}

///
/// EventMetrics
/// In-memory counters; the default `MetricsSink`.
///

pub struct EventMetrics {
    state: Mutex<EventReport>,
}

impl EventMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EventReport {
                ops: EventOps::default(),
                since: Timestamp::now(),
            }),
        }
    }

    #[must_use]
    pub fn report(&self) -> EventReport {
        self.state.lock().clone()
    }

    pub fn reset(&self) {
        *self.state.lock() = EventReport {
            ops: EventOps::default(),
            since: Timestamp::now(),
        };
    }
}

impl Default for EventMetrics {
    fn default() -> Self {
        Self::new()
    }
}

const fn bump(counter: &mut u64, by: u64) {
    *counter = counter.saturating_add(by);
}

impl MetricsSink for EventMetrics {
    fn record(&self, event: MetricsEvent) {
        let mut state = self.state.lock();
        let ops = &mut state.ops;

        match event {
            MetricsEvent::Plan { kind } => match kind {
                PlanKind::FullScan => bump(&mut ops.plan_full_scan, 1),
                PlanKind::Index => bump(&mut ops.plan_index, 1),
            },

            MetricsEvent::FetchFinish {
                rows_visited,
                rows_matched,
                exhausted,
            } => {
                bump(&mut ops.fetch_calls, 1);
                bump(&mut ops.rows_visited, rows_visited);
                bump(&mut ops.rows_matched, rows_matched);
                if exhausted {
                    bump(&mut ops.fetch_exhausted, 1);
                }
            }

            MetricsEvent::FetchFailed { class } => {
                bump(&mut ops.fetch_calls, 1);
                if matches!(class, ErrorClass::StoreAccess) {
                    bump(&mut ops.fetch_access_failures, 1);
                } else {
                    bump(&mut ops.fetch_fatal_failures, 1);
                }
            }

            MetricsEvent::PageApplied { rows } => {
                bump(&mut ops.pages_applied, 1);
                bump(&mut ops.rows_applied, rows);
            }

            MetricsEvent::StaleDiscarded => bump(&mut ops.stale_discards, 1),

            MetricsEvent::SeedBatch { rows } => {
                bump(&mut ops.seed_batches, 1);
                bump(&mut ops.seed_rows, rows);
            }
        }
    }
}
