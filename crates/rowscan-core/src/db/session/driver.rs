//! Module: session::driver
//! Responsibility: run a `QuerySession` against a live store on tokio.
//! Does not own: query lifecycle rules (session) or page assembly (executor).

use crate::{
    config::SessionConfig,
    db::{
        query::FilterSpec,
        session::{ApplyOutcome, FetchOutcome, PendingFetch, QuerySession},
        store::StoreHandle,
    },
    model::IndexName,
};
use std::time::Instant;
use tokio::sync::mpsc;

///
/// DriverEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DriverEvent {
    /// A fetch finished and was handed to the session.
    Applied(ApplyOutcome),

    /// The debounce timer fired.
    Debounced { fetch_issued: bool },
}

///
/// SessionDriver
///
/// Spawns every `PendingFetch` as its own task and feeds outcomes back in
/// completion order. Superseded fetches are never aborted; the session drops
/// their results by generation.
///

pub struct SessionDriver {
    store: StoreHandle,
    session: QuerySession,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    in_flight: usize,
}

impl SessionDriver {
    #[must_use]
    pub fn new(store: StoreHandle, config: SessionConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            store,
            session: QuerySession::new(config),
            tx,
            rx,
            in_flight: 0,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &QuerySession {
        &self.session
    }

    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn start(&mut self) -> bool {
        let pending = self.session.start();
        self.spawn(pending)
    }

    pub fn set_search_input(&mut self, text: &str) {
        self.session.set_search_input(text, Instant::now());
    }

    pub fn click_sort(&mut self, key: IndexName) -> bool {
        let pending = self.session.click_sort(key);
        self.spawn(pending)
    }

    pub fn reset_sort(&mut self) -> bool {
        let pending = self.session.reset_sort();
        self.spawn(pending)
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.session.set_filter(filter);
    }

    pub fn scroll_near_bottom(&mut self) -> bool {
        let pending = self.session.scroll_near_bottom();
        self.spawn(pending)
    }

    /// Wait for the next fetch completion or debounce deadline.
    ///
    /// Returns `None` when nothing is in flight and no debounce is pending.
    pub async fn next_event(&mut self) -> Option<DriverEvent> {
        let deadline = self.session.debounce_deadline();
        if self.in_flight == 0 && deadline.is_none() {
            return None;
        }

        let wake = deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std);

        tokio::select! {
            Some(outcome) = self.rx.recv(), if self.in_flight > 0 => {
                self.in_flight -= 1;
                Some(DriverEvent::Applied(self.session.apply(outcome)))
            }
            () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                let pending = self.session.poll_debounce(Instant::now());
                let fetch_issued = self.spawn(pending);
                Some(DriverEvent::Debounced { fetch_issued })
            }
        }
    }

    /// Drain events until every fetch has landed and no debounce is pending.
    pub async fn settle(&mut self) -> Vec<DriverEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }

        events
    }

    fn spawn(&mut self, pending: Option<PendingFetch>) -> bool {
        let Some(pending) = pending else {
            return false;
        };

        let store = self.store.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let outcome = pending.run(store.as_ref()).await;
            // The receiver only disappears with the driver itself.
            let _ = tx.send(outcome);
        });

        true
    }
}
