//! Module: db::store
//! Responsibility: the record store contract (ordered primary map, secondary
//! indexes, cursor scans, counts, batch writes) and its in-memory engine.
//! Does not own: scan planning, page assembly or query lifecycle.

mod error;
mod memory;
pub mod schema;

#[cfg(test)]
mod tests;

pub use error::{StoreAccessError, StoreOpenError, StoreWriteError};
pub use memory::MemoryStore;
pub use schema::{SCHEMA_STEPS, SCHEMA_VERSION, SchemaStep};

use crate::{
    db::direction::Direction,
    model::{IndexName, Record},
    types::RecordId,
};
use async_trait::async_trait;
use std::{fmt, sync::Arc};

///
/// StoreHandle
///
/// Shared connection to one record store. Cloned into every fetch and into
/// the seeder; there is no explicit teardown.
///

pub type StoreHandle = Arc<dyn RecordStore>;

///
/// ScanSource
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScanSource {
    PrimaryKey,
    Index(IndexName),
}

impl fmt::Display for ScanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey => f.write_str("primary_key"),
            Self::Index(index) => write!(f, "index:{index}"),
        }
    }
}

///
/// ScanStart
///
/// Where a cursor opens. `AfterKey` is an exclusive bound in scan direction
/// and is only meaningful for primary-key scans.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ScanStart {
    #[default]
    First,
    AfterKey(RecordId),
}

///
/// CursorRequest
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CursorRequest {
    pub source: ScanSource,
    pub direction: Direction,
    pub start: ScanStart,
}

impl CursorRequest {
    #[must_use]
    pub const fn primary(direction: Direction, start: ScanStart) -> Self {
        Self {
            source: ScanSource::PrimaryKey,
            direction,
            start,
        }
    }

    #[must_use]
    pub const fn index(index: IndexName, direction: Direction) -> Self {
        Self {
            source: ScanSource::Index(index),
            direction,
            start: ScanStart::First,
        }
    }
}

///
/// RecordCursor
///
/// Sequential, resumable iterator over one ordered store range. A cursor
/// does not pin a snapshot: records appended past its position are seen.
///

#[async_trait]
pub trait RecordCursor: Send {
    /// Next record in scan order, or `None` once the range is exhausted.
    async fn next(&mut self) -> Result<Option<Record>, StoreAccessError>;

    /// Skip up to `count` entries; returns how many were actually skipped.
    async fn advance(&mut self, count: u64) -> Result<u64, StoreAccessError>;
}

///
/// RecordStore
///
/// Ordered key-value store keyed by `RecordId` with the secondary indexes
/// named in `IndexName`. Implementations must be safe for any number of
/// concurrent read cursors alongside batch writes.
///

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store name (database identity).
    fn name(&self) -> &str;

    /// Current schema version.
    fn schema_version(&self) -> u32;

    /// Whether the store currently maintains `index`.
    fn has_index(&self, index: IndexName) -> bool;

    /// Total number of stored records.
    async fn count(&self) -> Result<u64, StoreAccessError>;

    /// Open a cursor positioned before the first entry of `request`.
    async fn open_cursor(
        &self,
        request: CursorRequest,
    ) -> Result<Box<dyn RecordCursor + '_>, StoreAccessError>;

    /// Add a batch of new records atomically.
    async fn put_batch(&self, records: Vec<Record>) -> Result<(), StoreWriteError>;
}
