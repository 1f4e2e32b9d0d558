//! Module: db::session
//! Responsibility: the lifecycle of the current query (generations, debounce,
//! mode multiplexing, single in-flight fetch, filter derivation).
//! Does not own: running fetches (caller or `SessionDriver`) or rendering.

mod context;
mod debounce;
pub mod driver;
mod pending;


pub use context::{ApplyOutcome, Generation, QueryContext};
pub use debounce::Debouncer;
pub use driver::{DriverEvent, SessionDriver};
pub use pending::{FetchOutcome, PendingFetch};

use crate::{
    config::SessionConfig,
    db::query::{FilterSpec, QueryMode, SearchTerm, SortSpec},
    error::InternalError,
    model::{IndexName, Record},
};
use std::{fmt, time::Instant};

///
/// SessionPhase
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SessionPhase {
    /// Nothing has been queried yet.
    Idle,
    /// Search input is waiting out the debounce delay.
    Debouncing,
    /// First page of the active context is in flight.
    Fetching,
    /// The active context is idle and can be extended.
    Ready,
    /// A continuation page is in flight.
    FetchingMore,
    /// A fatal error stopped the active context.
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Debouncing => "debouncing",
            Self::Fetching => "fetching",
            Self::Ready => "ready",
            Self::FetchingMore => "fetching_more",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

///
/// QuerySession
///
/// Synchronous controller for one table view. Every input returns either a
/// `PendingFetch` the caller must run or nothing; outcomes come back through
/// `apply`. The session never performs I/O itself.
///
/// The requested sort is tracked separately from the active context: while a
/// search is active a sort click is remembered and takes effect once the
/// search is cleared.
///

#[derive(Debug)]
pub struct QuerySession {
    config: SessionConfig,
    sort: SortSpec,
    filter: FilterSpec,
    debouncer: Debouncer,
    context: Option<QueryContext>,
    generation: Generation,
    failure: Option<InternalError>,
}

impl QuerySession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce()),
            config,
            sort: SortSpec::NONE,
            filter: FilterSpec::default(),
            context: None,
            generation: Generation::ZERO,
            failure: None,
        }
    }

    // ---------------------------------------------------------------------
    // Inputs
    // ---------------------------------------------------------------------

    /// Issue the first query. A no-op once the session has started.
    pub fn start(&mut self) -> Option<PendingFetch> {
        if self.context.is_some() {
            return None;
        }

        Some(self.begin_context(SearchTerm::default()))
    }

    /// Record raw search text; the query waits for `poll_debounce`.
    pub fn set_search_input(&mut self, text: &str, now: Instant) {
        self.debouncer.input(text, now);
    }

    /// Fire the debounce once its deadline has passed.
    ///
    /// Returns a fetch only when the effective inputs actually changed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<PendingFetch> {
        let raw = self.debouncer.poll(now)?;
        let term = SearchTerm::new(&raw);

        if !self.inputs_changed(&term) {
            tracing::debug!(term = %term, "debounced search unchanged");
            return None;
        }

        Some(self.begin_context(term))
    }

    /// Header click on `key`.
    ///
    /// While a search is active the new sort is only remembered.
    pub fn click_sort(&mut self, key: IndexName) -> Option<PendingFetch> {
        self.sort = self.sort.cycle(key);
        self.resort()
    }

    /// Clear the sort, returning to insertion order.
    pub fn reset_sort(&mut self) -> Option<PendingFetch> {
        if !self.sort.is_sorted() {
            return None;
        }

        self.sort = SortSpec::NONE;
        self.resort()
    }

    /// Replace the row filter. Never fetches.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter.normalized();
    }

    /// Continue the active context when the view nears its end.
    pub fn scroll_near_bottom(&mut self) -> Option<PendingFetch> {
        if self.phase() != SessionPhase::Ready || !self.has_more() {
            return None;
        }

        let page_size = self.config.page_size;
        let context = self.context.as_mut()?;
        let request = context.begin_fetch(page_size);

        Some(PendingFetch {
            generation: context.generation(),
            request,
        })
    }

    /// Merge a finished fetch.
    pub fn apply(&mut self, outcome: FetchOutcome) -> ApplyOutcome {
        let Some(context) = self.context.as_mut() else {
            return ApplyOutcome::Stale;
        };

        let applied = context.apply(outcome);
        if let ApplyOutcome::Failed(err) = &applied {
            if err.is_fatal() {
                tracing::warn!(error = %err.display_with_class(), "query failed");
                self.failure = Some(err.clone());
            } else {
                tracing::info!(error = %err.display_with_class(), "page fetch failed; scroll to retry");
            }
        }

        applied
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.debouncer.is_pending() {
            return SessionPhase::Debouncing;
        }

        match &self.context {
            None => SessionPhase::Idle,
            Some(_) if self.failure.is_some() => SessionPhase::Failed,
            Some(ctx) if ctx.is_loading() && ctx.pages_applied() == 0 => SessionPhase::Fetching,
            Some(ctx) if ctx.is_loading() => SessionPhase::FetchingMore,
            Some(_) => SessionPhase::Ready,
        }
    }

    #[must_use]
    pub fn mode(&self) -> QueryMode {
        self.context
            .as_ref()
            .map_or(QueryMode::Default, QueryContext::mode)
    }

    /// Requested sort; may differ from the active context while searching.
    #[must_use]
    pub const fn sort(&self) -> SortSpec {
        self.sort
    }

    #[must_use]
    pub fn search_term(&self) -> Option<&SearchTerm> {
        self.context.as_ref().map(QueryContext::search)
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub const fn context(&self) -> Option<&QueryContext> {
        self.context.as_ref()
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&InternalError> {
        self.failure.as_ref()
    }

    #[must_use]
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.context.as_ref().is_some_and(QueryContext::has_more)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.context.as_ref().is_some_and(QueryContext::is_loading)
    }

    #[must_use]
    pub fn buffer(&self) -> &[Record] {
        self.context.as_ref().map_or(&[][..], QueryContext::buffer)
    }

    /// Buffered rows that pass the current filter, in buffer order.
    #[must_use]
    pub fn visible_records(&self) -> Vec<&Record> {
        self.filter.apply(self.buffer()).collect()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn resort(&mut self) -> Option<PendingFetch> {
        let term = self.current_term();
        if term.is_active() {
            tracing::debug!(sort = %self.sort, "sort recorded while searching");
            return None;
        }

        Some(self.begin_context(term))
    }

    fn current_term(&self) -> SearchTerm {
        self.context
            .as_ref()
            .map(|ctx| ctx.search().clone())
            .unwrap_or_default()
    }

    fn inputs_changed(&self, term: &SearchTerm) -> bool {
        let Some(context) = &self.context else {
            return true;
        };
        if self.failure.is_some() {
            return true;
        }

        match QueryMode::resolve(&self.sort, term) {
            mode if mode != context.mode() => true,
            QueryMode::Searching => term != context.search(),
            QueryMode::Sorted | QueryMode::Default => self.sort != context.sort(),
        }
    }

    // Supersede the active context and issue its first page.
    fn begin_context(&mut self, term: SearchTerm) -> PendingFetch {
        self.generation = self.generation.next();
        self.failure = None;

        let mut context = QueryContext::new(self.generation, self.sort, term);
        let request = context.begin_fetch(self.config.page_size);
        tracing::debug!(
            generation = %self.generation,
            mode = %context.mode(),
            strategy = %context.strategy(),
            "new query context"
        );
        self.context = Some(context);

        PendingFetch {
            generation: self.generation,
            request,
        }
    }
}
