//! Module: query::plan
//! Responsibility: choose the store scan for one (sort, search) combination.
//! Does not own: resume-position decoding (executor) or predicate matching.

use crate::{
    db::{direction::Direction, executor::ResumeToken, query::SortSpec, store::ScanSource},
    model::IndexName,
};
use std::fmt;

///
/// ScanStrategy
///
/// Cursor source plus traversal direction. Primary-key scans resume after the
/// last consumed key; index scans resume by ordinal offset because index
/// values are not unique.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ScanStrategy {
    pub source: ScanSource,
    pub direction: Direction,
}

impl ScanStrategy {
    /// Full-table scan in insertion order.
    pub const FULL_SCAN: Self = Self {
        source: ScanSource::PrimaryKey,
        direction: Direction::Asc,
    };

    #[must_use]
    pub const fn index(index: IndexName, direction: Direction) -> Self {
        Self {
            source: ScanSource::Index(index),
            direction,
        }
    }

    /// Token for the first page of this scan.
    #[must_use]
    pub const fn initial_token(&self) -> ResumeToken {
        ResumeToken::Start
    }

    /// Index scans resume by ordinal offset rather than by key.
    #[must_use]
    pub const fn uses_offset_tokens(&self) -> bool {
        matches!(self.source, ScanSource::Index(_))
    }
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.direction.as_str())
    }
}

/// Pick the scan for a query.
///
/// Search is never index-accelerated: no index answers substring
/// containment, so every record has to be visited in primary-key order.
#[must_use]
pub const fn plan(sort: SortSpec, search_active: bool) -> ScanStrategy {
    if search_active {
        return ScanStrategy::FULL_SCAN;
    }

    match sort.key {
        None => ScanStrategy::FULL_SCAN,
        Some(index) => ScanStrategy::index(index, sort.direction),
    }
}
