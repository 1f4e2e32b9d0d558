use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

///
/// RecordId
///
/// Primary key of a record. Assigned in insertion order starting at 1 and
/// never reused, so it is the one totally ordered field that can resume an
/// unsorted scan.
///

#[derive(
    Clone,
    Copy,
    Debug,
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
pub struct RecordId(u64);

impl RecordId {
    pub const MIN: Self = Self(1);

    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Id assigned to the record generated at a zero-based seeding offset.
    #[must_use]
    pub const fn from_offset(offset: u64) -> Self {
        Self(offset.saturating_add(1))
    }
}
