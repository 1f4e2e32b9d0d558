//! Shared fixtures for unit tests.

use crate::{
    db::store::{
        CursorRequest, MemoryStore, RecordCursor, RecordStore, SCHEMA_VERSION, StoreAccessError,
        StoreHandle, StoreWriteError,
    },
    model::{IndexName, Record},
    types::{RecordId, Timestamp},
};
use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering},
};
use tokio::sync::Semaphore;

/// Build one record with predictable derived fields.
pub(crate) fn record(id: u64, name: &str, score: u8) -> Record {
    Record {
        id: RecordId::new(id),
        name: name.to_string(),
        email: format!("{}{id}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: format!("+91{:010}", 6_000_000_000_u64 + id),
        score,
        last_activity_at: Timestamp::from_millis(1_700_000_000_000 + id * 1_000),
        added_by: "System".to_string(),
        avatar: String::new(),
    }
}

/// The three-record store used by the table scenarios: Bob, Ann, Cara.
pub(crate) fn scenario_records() -> Vec<Record> {
    vec![record(1, "Bob", 10), record(2, "Ann", 60), record(3, "Cara", 80)]
}

/// `count` records named `User {id}` with scores cycling through 0..100.
pub(crate) fn numbered_records(count: u64) -> Vec<Record> {
    (1..=count)
        .map(|id| {
            let score = u8::try_from(id * 37 % 100).unwrap_or_default();
            record(id, &format!("User {id}"), score)
        })
        .collect()
}

pub(crate) async fn memory_store(records: Vec<Record>) -> Arc<MemoryStore> {
    let store = Arc::new(
        MemoryStore::open("test", SCHEMA_VERSION).expect("test store should open"),
    );
    if !records.is_empty() {
        store
            .put_batch(records)
            .await
            .expect("test records should insert");
    }

    store
}

pub(crate) async fn handle(records: Vec<Record>) -> StoreHandle {
    memory_store(records).await
}

///
/// FlakyStore
///
/// Wraps a store and fails reads while `failing` is set.
///

pub(crate) struct FlakyStore {
    inner: StoreHandle,
    failing: AtomicBool,
    opened: AtomicU32,
}

impl FlakyStore {
    pub(crate) fn new(inner: StoreHandle) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            opened: AtomicU32::new(0),
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn cursors_opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreAccessError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreAccessError::Cursor("injected failure".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn schema_version(&self) -> u32 {
        self.inner.schema_version()
    }

    fn has_index(&self, index: IndexName) -> bool {
        self.inner.has_index(index)
    }

    async fn count(&self) -> Result<u64, StoreAccessError> {
        self.check()?;
        self.inner.count().await
    }

    async fn open_cursor(
        &self,
        request: CursorRequest,
    ) -> Result<Box<dyn RecordCursor + '_>, StoreAccessError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.open_cursor(request).await
    }

    async fn put_batch(&self, records: Vec<Record>) -> Result<(), StoreWriteError> {
        self.inner.put_batch(records).await
    }
}

///
/// GatedStore
///
/// Holds every cursor open until a permit is released, so a test can keep a
/// fetch in flight while it changes the session's inputs.
///

pub(crate) struct GatedStore {
    inner: StoreHandle,
    gate: Semaphore,
}

impl GatedStore {
    pub(crate) const fn new(inner: StoreHandle) -> Self {
        Self {
            inner,
            gate: Semaphore::const_new(0),
        }
    }

    /// Let `n` blocked cursor opens through.
    pub(crate) fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl RecordStore for GatedStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn schema_version(&self) -> u32 {
        self.inner.schema_version()
    }

    fn has_index(&self, index: IndexName) -> bool {
        self.inner.has_index(index)
    }

    async fn count(&self) -> Result<u64, StoreAccessError> {
        self.inner.count().await
    }

    async fn open_cursor(
        &self,
        request: CursorRequest,
    ) -> Result<Box<dyn RecordCursor + '_>, StoreAccessError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| StoreAccessError::Closed)?;
        permit.forget();

        self.inner.open_cursor(request).await
    }

    async fn put_batch(&self, records: Vec<Record>) -> Result<(), StoreWriteError> {
        self.inner.put_batch(records).await
    }
}
