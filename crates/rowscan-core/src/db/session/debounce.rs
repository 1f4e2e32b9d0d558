use std::time::{Duration, Instant};

///
/// Debouncer
///
/// Holds the latest raw search input until it has been quiet for `delay`.
/// Every new input restarts the wait.
///

#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

#[derive(Clone, Debug)]
struct Pending {
    raw: String,
    deadline: Instant,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, raw: impl Into<String>, now: Instant) {
        self.pending = Some(Pending {
            raw: raw.into(),
            deadline: now + self.delay,
        });
    }

    /// Take the pending input once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.pending.take().map(|p| p.raw),
            _ => None,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
