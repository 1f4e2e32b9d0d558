//! Module: db::query
//! Responsibility: query inputs (sort, search, filter), mode resolution and
//! scan planning.
//! Does not own: cursor execution or result buffering.

mod filter;
pub mod plan;


pub use filter::FilterSpec;
pub use plan::{ScanStrategy, plan};

use crate::{db::direction::Direction, model::IndexName};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// SortSpec
///
/// `key = None` is insertion order (primary key ascending); the direction is
/// then ignored.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SortSpec {
    pub key: Option<IndexName>,
    pub direction: Direction,
}

impl SortSpec {
    pub const NONE: Self = Self {
        key: None,
        direction: Direction::Asc,
    };

    #[must_use]
    pub const fn asc(key: IndexName) -> Self {
        Self {
            key: Some(key),
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub const fn desc(key: IndexName) -> Self {
        Self {
            key: Some(key),
            direction: Direction::Desc,
        }
    }

    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        self.key.is_some()
    }

    /// Next spec after a header click on `clicked`.
    ///
    /// Clicking the active column cycles asc → desc → unsorted; clicking any
    /// other column starts it ascending.
    #[must_use]
    pub fn cycle(self, clicked: IndexName) -> Self {
        match self.key {
            Some(key) if key == clicked => match self.direction {
                Direction::Asc => Self::desc(clicked),
                Direction::Desc => Self::NONE,
            },
            _ => Self::asc(clicked),
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            Some(key) => write!(f, "{key} {}", self.direction.as_str()),
            None => f.write_str("none"),
        }
    }
}

///
/// SearchTerm
///
/// Normalized (trimmed, lower-cased) search text. Empty means search is off.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchTerm(String);

impl SearchTerm {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// QueryMode
///
/// Mutually exclusive top-level query behaviours. Search wins over sort.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Default,
    Sorted,
    Searching,
}

impl QueryMode {
    #[must_use]
    pub fn resolve(sort: &SortSpec, search: &SearchTerm) -> Self {
        if search.is_active() {
            Self::Searching
        } else if sort.is_sorted() {
            Self::Sorted
        } else {
            Self::Default
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Default => "default",
            Self::Sorted => "sorted",
            Self::Searching => "searching",
        };
        f.write_str(label)
    }
}
