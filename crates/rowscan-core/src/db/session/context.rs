//! Module: session::context
//! Responsibility: one query's growing result buffer and resume position.
//! Does not own: deciding when a new context starts (session controller).

use crate::{
    db::{
        executor::{FetchRequest, ResumeToken},
        query::{QueryMode, ScanStrategy, SearchTerm, SortSpec, plan},
        session::FetchOutcome,
    },
    error::InternalError,
    model::Record,
    obs::sink::{self, MetricsEvent},
};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

///
/// Generation
///
/// Identity of the authoritative query context. Strictly increases whenever
/// inputs change; results tagged with an older generation are stale.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// ApplyOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ApplyOutcome {
    /// The page was merged into the buffer.
    Applied { appended: usize },

    /// The outcome belonged to a superseded context; nothing changed.
    Stale,

    /// The fetch failed; cursor, buffer and exhaustion are unchanged.
    Failed(InternalError),
}

///
/// QueryContext
///
/// Buffer, cursor and exhaustion for one (mode, sort, search) combination.
/// The buffer only ever grows by appending whole pages.
///

#[derive(Clone, Debug)]
pub struct QueryContext {
    mode: QueryMode,
    sort: SortSpec,
    search: SearchTerm,
    strategy: ScanStrategy,
    cursor: ResumeToken,
    exhausted: bool,
    buffer: Vec<Record>,
    generation: Generation,
    loading: bool,
    pages_applied: u64,
}

impl QueryContext {
    #[must_use]
    pub fn new(generation: Generation, sort: SortSpec, search: SearchTerm) -> Self {
        let strategy = plan(sort, search.is_active());

        Self {
            mode: QueryMode::resolve(&sort, &search),
            sort,
            search,
            strategy,
            cursor: strategy.initial_token(),
            exhausted: false,
            buffer: Vec::new(),
            generation,
            loading: false,
            pages_applied: 0,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> QueryMode {
        self.mode
    }

    #[must_use]
    pub const fn sort(&self) -> SortSpec {
        self.sort
    }

    #[must_use]
    pub const fn search(&self) -> &SearchTerm {
        &self.search
    }

    #[must_use]
    pub const fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    #[must_use]
    pub const fn cursor(&self) -> ResumeToken {
        self.cursor
    }

    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        !self.exhausted
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn pages_applied(&self) -> u64 {
        self.pages_applied
    }

    #[must_use]
    pub fn buffer(&self) -> &[Record] {
        &self.buffer
    }

    /// Mark a fetch in flight and build its request from the current cursor.
    pub(crate) fn begin_fetch(&mut self, page_size: u32) -> FetchRequest {
        self.loading = true;

        FetchRequest::new(self.sort, self.search.clone(), self.cursor, page_size)
    }

    /// Merge one fetch outcome.
    ///
    /// Outcomes from another generation never touch this context.
    pub fn apply(&mut self, outcome: FetchOutcome) -> ApplyOutcome {
        if outcome.generation != self.generation {
            sink::record(MetricsEvent::StaleDiscarded);
            tracing::warn!(
                stale = %outcome.generation,
                active = %self.generation,
                "discarding stale fetch result"
            );
            return ApplyOutcome::Stale;
        }

        self.loading = false;

        match outcome.result {
            Ok(response) => {
                let appended = response.records.len();
                if self.pages_applied == 0 {
                    self.buffer = response.records;
                } else {
                    self.buffer.extend(response.records);
                }
                self.cursor = response.resume_token;
                self.exhausted = response.exhausted;
                self.pages_applied += 1;

                sink::record(MetricsEvent::PageApplied {
                    rows: appended as u64,
                });

                ApplyOutcome::Applied { appended }
            }
            Err(err) => ApplyOutcome::Failed(err),
        }
    }
}
