use crate::{
    config::StoreConfig,
    db::{
        direction::Direction,
        store::{
            CursorRequest, RecordCursor, RecordStore, ScanSource, ScanStart, StoreAccessError,
            StoreOpenError, StoreWriteError,
            schema::{SCHEMA_VERSION, pending_steps},
        },
    },
    model::{IndexName, IndexValue, Record},
    types::RecordId,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    ops::Bound,
    sync::atomic::{AtomicBool, Ordering},
};

type IndexEntry = (IndexValue, RecordId);

///
/// MemoryStore
///
/// In-process ordered record store: a primary `BTreeMap` keyed by id plus one
/// ordered `(value, id)` set per secondary index. Every operation takes the
/// lock for one step only, so cursors interleave with batch writes.
///

pub struct MemoryStore {
    name: String,
    state: RwLock<StoreState>,
    closed: AtomicBool,
}

#[derive(Default)]
struct StoreState {
    version: u32,
    records: BTreeMap<RecordId, Record>,
    indexes: BTreeMap<IndexName, BTreeSet<IndexEntry>>,
}

impl MemoryStore {
    /// Create an empty store and bring it to `version`.
    pub fn open(name: impl Into<String>, version: u32) -> Result<Self, StoreOpenError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StoreOpenError::EmptyName);
        }

        let store = Self {
            name,
            state: RwLock::new(StoreState::default()),
            closed: AtomicBool::new(false),
        };
        store.upgrade(version)?;

        Ok(store)
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreOpenError> {
        Self::open(config.name.clone(), config.schema_version)
    }

    /// Re-open at `version`: newer versions add their indexes (built from the
    /// stored records); the current or an older version is a no-op.
    pub fn upgrade(&self, version: u32) -> Result<(), StoreOpenError> {
        if version == 0 {
            return Err(StoreOpenError::InvalidVersion);
        }
        if version > SCHEMA_VERSION {
            return Err(StoreOpenError::UnknownVersion {
                requested: version,
                latest: SCHEMA_VERSION,
            });
        }

        let mut state = self.state.write();
        let current = state.version;
        // Older versions' indexes are a subset of the current ones.
        if version <= current {
            tracing::debug!(
                store = %self.name,
                requested = version,
                current,
                "record store already at or past requested version"
            );
            return Ok(());
        }

        // Build everything first so a failed step leaves the store untouched.
        let mut built = Vec::new();
        for step in pending_steps(current, version) {
            for &index in step.indexes {
                if state.indexes.contains_key(&index) {
                    continue;
                }
                built.push((index, build_index(&state.records, index)?));
            }
        }

        let added = built.len();
        state.indexes.extend(built);
        state.version = version;
        drop(state);

        tracing::info!(
            store = %self.name,
            from = current,
            to = version,
            indexes_added = added,
            "record store schema upgraded"
        );

        Ok(())
    }

    /// Drop the connection; every later operation fails with `Closed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Index names currently maintained, in index order.
    #[must_use]
    pub fn indexes(&self) -> Vec<IndexName> {
        self.state.read().indexes.keys().copied().collect()
    }

    fn ensure_open(&self) -> Result<(), StoreAccessError> {
        if self.is_closed() {
            return Err(StoreAccessError::Closed);
        }

        Ok(())
    }
}

// Build one secondary index over existing records, enforcing uniqueness.
fn build_index(
    records: &BTreeMap<RecordId, Record>,
    index: IndexName,
) -> Result<BTreeSet<IndexEntry>, StoreOpenError> {
    let mut entries = BTreeSet::new();
    let mut seen = HashSet::new();

    for (id, record) in records {
        let value = record.index_value(index);
        if index.is_unique() && !seen.insert(value.clone()) {
            return Err(StoreOpenError::IndexBuild {
                index,
                reason: format!("duplicate value {value:?}"),
            });
        }
        entries.insert((value, *id));
    }

    Ok(entries)
}

fn unique_value_taken(entries: &BTreeSet<IndexEntry>, value: &IndexValue) -> bool {
    let lower = (value.clone(), RecordId::new(0));

    entries
        .range((Bound::Included(&lower), Bound::Unbounded))
        .next()
        .is_some_and(|(existing, _)| existing == value)
}

fn display_value(value: &IndexValue) -> String {
    match value {
        IndexValue::Text(text) => text.clone(),
        IndexValue::Uint(n) => n.to_string(),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema_version(&self) -> u32 {
        self.state.read().version
    }

    fn has_index(&self, index: IndexName) -> bool {
        self.state.read().indexes.contains_key(&index)
    }

    async fn count(&self) -> Result<u64, StoreAccessError> {
        self.ensure_open()?;

        Ok(self.state.read().records.len() as u64)
    }

    async fn open_cursor(
        &self,
        request: CursorRequest,
    ) -> Result<Box<dyn RecordCursor + '_>, StoreAccessError> {
        self.ensure_open()?;

        let position = match (request.source, request.start) {
            (_, ScanStart::First) => Position::Start,
            (ScanSource::PrimaryKey, ScanStart::AfterKey(id)) => Position::AfterKey(id),
            (ScanSource::Index(index), ScanStart::AfterKey(_)) => {
                return Err(StoreAccessError::InvalidBound(index));
            }
        };
        if let ScanSource::Index(index) = request.source
            && !self.has_index(index)
        {
            return Err(StoreAccessError::UnknownIndex(index));
        }

        Ok(Box::new(MemoryCursor {
            store: self,
            source: request.source,
            direction: request.direction,
            position,
        }))
    }

    async fn put_batch(&self, records: Vec<Record>) -> Result<(), StoreWriteError> {
        if self.is_closed() {
            return Err(StoreWriteError::Closed);
        }

        let mut state = self.state.write();

        // Phase 1: validate the whole batch against the store and itself.
        let mut batch_ids = HashSet::with_capacity(records.len());
        let mut batch_unique: BTreeMap<IndexName, HashSet<IndexValue>> = BTreeMap::new();
        for record in &records {
            if state.records.contains_key(&record.id) || !batch_ids.insert(record.id) {
                return Err(StoreWriteError::KeyExists(record.id));
            }

            for (index, entries) in &state.indexes {
                if !index.is_unique() {
                    continue;
                }
                let value = record.index_value(*index);
                let fresh = batch_unique.entry(*index).or_default().insert(value.clone());
                if !fresh || unique_value_taken(entries, &value) {
                    return Err(StoreWriteError::UniqueViolation {
                        index: *index,
                        value: display_value(&value),
                    });
                }
            }
        }

        // Phase 2: apply.
        for record in records {
            for (index, entries) in &mut state.indexes {
                entries.insert((record.index_value(*index), record.id));
            }
            state.records.insert(record.id, record);
        }

        Ok(())
    }
}

///
/// Position
///
/// Last entry a cursor consumed; the next step resumes strictly after it.
///

#[derive(Clone, Debug)]
enum Position {
    Start,
    AfterKey(RecordId),
    AfterEntry(IndexEntry),
}

///
/// MemoryCursor
///

struct MemoryCursor<'a> {
    store: &'a MemoryStore,
    source: ScanSource,
    direction: Direction,
    position: Position,
}

impl MemoryCursor<'_> {
    // Walk up to `limit` entries after the current position under one read
    // lock, handing each record to `visit`. Returns the number walked.
    fn walk(
        &mut self,
        limit: u64,
        mut visit: impl FnMut(&Record),
    ) -> Result<u64, StoreAccessError> {
        self.store.ensure_open()?;
        let state = self.store.state.read();
        let mut walked = 0_u64;

        match self.source {
            ScanSource::PrimaryKey => {
                let after = match &self.position {
                    Position::Start => None,
                    Position::AfterKey(id) => Some(*id),
                    Position::AfterEntry(_) => {
                        return Err(StoreAccessError::Cursor(
                            "primary cursor holds an index position".to_string(),
                        ));
                    }
                };
                let range = match after {
                    None => state.records.range::<RecordId, _>(..),
                    Some(id) => match self.direction {
                        Direction::Asc => {
                            state.records.range((Bound::Excluded(id), Bound::Unbounded))
                        }
                        Direction::Desc => state.records.range(..id),
                    },
                };
                let entries: Box<dyn Iterator<Item = (&RecordId, &Record)> + '_> = match self.direction {
                    Direction::Asc => Box::new(range),
                    Direction::Desc => Box::new(range.rev()),
                };

                for (id, record) in entries {
                    if walked == limit {
                        break;
                    }
                    visit(record);
                    walked += 1;
                    self.position = Position::AfterKey(*id);
                }
            }

            ScanSource::Index(index) => {
                let Some(set) = state.indexes.get(&index) else {
                    return Err(StoreAccessError::UnknownIndex(index));
                };
                let after = match &self.position {
                    Position::Start => None,
                    Position::AfterEntry(entry) => Some(entry),
                    Position::AfterKey(_) => return Err(StoreAccessError::InvalidBound(index)),
                };
                let range = match (after, self.direction) {
                    (None, _) => set.range::<IndexEntry, _>(..),
                    (Some(entry), Direction::Asc) => {
                        set.range((Bound::Excluded(entry), Bound::Unbounded))
                    }
                    (Some(entry), Direction::Desc) => {
                        set.range((Bound::Unbounded, Bound::Excluded(entry)))
                    }
                };
                let entries: Box<dyn Iterator<Item = &IndexEntry> + '_> = match self.direction {
                    Direction::Asc => Box::new(range),
                    Direction::Desc => Box::new(range.rev()),
                };

                let mut last = None;
                for entry in entries {
                    if walked == limit {
                        break;
                    }
                    // Entries and records are written under the same lock.
                    let Some(record) = state.records.get(&entry.1) else {
                        return Err(StoreAccessError::Cursor(format!(
                            "index '{index}' entry points at missing record {}",
                            entry.1
                        )));
                    };
                    visit(record);
                    walked += 1;
                    last = Some(entry);
                }
                if let Some(entry) = last {
                    self.position = Position::AfterEntry(entry.clone());
                }
            }
        }

        Ok(walked)
    }
}

#[async_trait]
impl RecordCursor for MemoryCursor<'_> {
    async fn next(&mut self) -> Result<Option<Record>, StoreAccessError> {
        let mut next = None;
        self.walk(1, |record| next = Some(record.clone()))?;

        Ok(next)
    }

    async fn advance(&mut self, count: u64) -> Result<u64, StoreAccessError> {
        if count == 0 {
            return Ok(0);
        }

        self.walk(count, |_| {})
    }
}
