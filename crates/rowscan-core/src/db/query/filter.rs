use crate::{
    model::{Record, record::contains_folded},
    types::Timestamp,
};
use serde::{Deserialize, Serialize};

///
/// FilterSpec
///
/// Post-fetch row predicate. Each present bound must hold (logical AND);
/// absent bounds impose nothing. Score and activity bounds are inclusive,
/// `added_by_contains` is a case-insensitive substring test whose needle
/// `normalized` trims and lowercases once, up front.
///
/// Filters never reach the store: they only narrow the already-buffered rows
/// a view displays.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    pub score_min: Option<u8>,
    pub score_max: Option<u8>,
    pub added_by_contains: Option<String>,
    pub activity_after: Option<Timestamp>,
    pub activity_before: Option<Timestamp>,
}

impl FilterSpec {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Fold the `added_by` needle the way search terms are folded; a blank
    /// needle becomes no bound at all.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.added_by_contains = self
            .added_by_contains
            .map(|needle| needle.trim().to_lowercase())
            .filter(|needle| !needle.is_empty());

        self
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        if self.score_min.is_some_and(|min| record.score < min) {
            return false;
        }
        if self.score_max.is_some_and(|max| record.score > max) {
            return false;
        }
        if self
            .activity_after
            .is_some_and(|after| record.last_activity_at < after)
        {
            return false;
        }
        if self
            .activity_before
            .is_some_and(|before| record.last_activity_at > before)
        {
            return false;
        }
        if self
            .added_by_contains
            .as_deref()
            .is_some_and(|needle| !contains_folded(&record.added_by, needle))
        {
            return false;
        }

        true
    }

    /// Borrow the rows of `records` this filter keeps, in order.
    pub fn apply<'a>(&'a self, records: &'a [Record]) -> impl Iterator<Item = &'a Record> + 'a {
        records.iter().filter(move |record| self.matches(record))
    }
}
