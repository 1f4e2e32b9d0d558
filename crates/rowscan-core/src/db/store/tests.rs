use super::*;
use crate::{
    error::{ErrorClass, InternalError},
    test_support::{memory_store, numbered_records, record, scenario_records},
};

async fn drain(cursor: &mut Box<dyn RecordCursor + '_>) -> Vec<u64> {
    let mut ids = Vec::new();
    while let Some(record) = cursor.next().await.expect("cursor step should succeed") {
        ids.push(record.id.get());
    }

    ids
}

#[tokio::test]
async fn primary_cursor_walks_ids_in_both_directions() {
    let store = memory_store(numbered_records(5)).await;

    let mut asc = store
        .open_cursor(CursorRequest::primary(Direction::Asc, ScanStart::First))
        .await
        .expect("asc cursor should open");
    assert_eq!(drain(&mut asc).await, vec![1, 2, 3, 4, 5]);

    let mut desc = store
        .open_cursor(CursorRequest::primary(Direction::Desc, ScanStart::First))
        .await
        .expect("desc cursor should open");
    assert_eq!(drain(&mut desc).await, vec![5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn primary_cursor_after_key_is_exclusive_in_scan_direction() {
    let store = memory_store(numbered_records(5)).await;

    let mut asc = store
        .open_cursor(CursorRequest::primary(
            Direction::Asc,
            ScanStart::AfterKey(RecordId::new(2)),
        ))
        .await
        .expect("bounded asc cursor should open");
    assert_eq!(drain(&mut asc).await, vec![3, 4, 5]);

    let mut desc = store
        .open_cursor(CursorRequest::primary(
            Direction::Desc,
            ScanStart::AfterKey(RecordId::new(4)),
        ))
        .await
        .expect("bounded desc cursor should open");
    assert_eq!(drain(&mut desc).await, vec![3, 2, 1]);
}

#[tokio::test]
async fn index_cursor_orders_ties_by_id() {
    let store = memory_store(vec![
        record(1, "Bob", 50),
        record(2, "Ann", 10),
        record(3, "Cara", 50),
        record(4, "Dev", 10),
    ])
    .await;

    let mut asc = store
        .open_cursor(CursorRequest::index(IndexName::Score, Direction::Asc))
        .await
        .expect("score cursor should open");
    assert_eq!(drain(&mut asc).await, vec![2, 4, 1, 3]);

    let mut desc = store
        .open_cursor(CursorRequest::index(IndexName::Score, Direction::Desc))
        .await
        .expect("score desc cursor should open");
    assert_eq!(drain(&mut desc).await, vec![3, 1, 4, 2]);
}

#[tokio::test]
async fn advance_skips_entries_and_reports_shortfall() {
    let store = memory_store(scenario_records()).await;
    let mut cursor = store
        .open_cursor(CursorRequest::index(IndexName::Name, Direction::Asc))
        .await
        .expect("name cursor should open");

    assert_eq!(cursor.advance(2).await.expect("advance should succeed"), 2);
    assert_eq!(drain(&mut cursor).await, vec![3], "Cara sorts last by name");
    assert_eq!(
        cursor.advance(5).await.expect("advance past end should succeed"),
        0
    );
}

#[tokio::test]
async fn cursor_sees_records_appended_past_its_position() {
    let store = memory_store(numbered_records(2)).await;
    let mut cursor = store
        .open_cursor(CursorRequest::primary(Direction::Asc, ScanStart::First))
        .await
        .expect("cursor should open");

    assert_eq!(drain(&mut cursor).await, vec![1, 2]);
    store
        .put_batch(vec![record(3, "Late", 1)])
        .await
        .expect("append should succeed");
    assert_eq!(drain(&mut cursor).await, vec![3]);
}

#[tokio::test]
async fn count_is_exact_and_closed_store_fails_reads() {
    let store = memory_store(numbered_records(7)).await;
    assert_eq!(store.count().await.expect("count should succeed"), 7);

    store.close();
    assert_eq!(store.count().await, Err(StoreAccessError::Closed));
    assert!(matches!(
        store
            .open_cursor(CursorRequest::primary(Direction::Asc, ScanStart::First))
            .await,
        Err(StoreAccessError::Closed)
    ));
    assert_eq!(
        store.put_batch(vec![record(8, "Nope", 1)]).await,
        Err(StoreWriteError::Closed)
    );
}

#[tokio::test]
async fn batch_writes_are_all_or_nothing() {
    let store = memory_store(scenario_records()).await;

    let mut duplicate_email = record(5, "Other", 1);
    duplicate_email.email = "ann2@example.com".to_string();
    let err = store
        .put_batch(vec![record(4, "Fresh", 1), duplicate_email])
        .await
        .expect_err("duplicate email should be rejected");
    assert!(matches!(
        err,
        StoreWriteError::UniqueViolation {
            index: IndexName::Email,
            ..
        }
    ));
    assert_eq!(
        store.count().await.expect("count should succeed"),
        3,
        "rejected batch must not leave partial writes"
    );

    let err = store
        .put_batch(vec![record(2, "Again", 1)])
        .await
        .expect_err("duplicate key should be rejected");
    assert_eq!(err, StoreWriteError::KeyExists(RecordId::new(2)));
    assert_eq!(InternalError::from(err).class, ErrorClass::Conflict);
}

#[tokio::test]
async fn schema_upgrade_backfills_new_indexes_without_data_loss() {
    let store = MemoryStore::open("legacy", 1).expect("v1 store should open");
    assert!(store.has_index(IndexName::Name));
    assert!(!store.has_index(IndexName::Score));

    store
        .put_batch(scenario_records())
        .await
        .expect("records should insert at v1");
    store.upgrade(2).expect("upgrade to v2 should succeed");

    assert_eq!(store.schema_version(), 2);
    assert_eq!(store.count().await.expect("count should succeed"), 3);
    let mut cursor = store
        .open_cursor(CursorRequest::index(IndexName::Score, Direction::Desc))
        .await
        .expect("backfilled score index should open");
    assert_eq!(drain(&mut cursor).await, vec![3, 2, 1]);
}

#[tokio::test]
async fn schema_reopen_at_same_or_older_version_is_noop() {
    let store = MemoryStore::open("db", 2).expect("store should open");
    store
        .put_batch(scenario_records())
        .await
        .expect("records should insert");

    store.upgrade(2).expect("same-version reopen should be a no-op");
    store.upgrade(1).expect("older-version reopen should be a no-op");

    // Phase 1: version, data and the v2 indexes all survive.
    assert_eq!(store.schema_version(), 2);
    assert_eq!(store.count().await.expect("count should succeed"), 3);
    assert_eq!(store.indexes(), IndexName::ALL.to_vec());
    let mut cursor = store
        .open_cursor(CursorRequest::index(IndexName::Score, Direction::Asc))
        .await
        .expect("score index should still open");
    assert_eq!(drain(&mut cursor).await, vec![1, 2, 3]);

    // Phase 2: unknown and invalid versions still fail.
    assert_eq!(
        store.upgrade(9),
        Err(StoreOpenError::UnknownVersion {
            requested: 9,
            latest: SCHEMA_VERSION
        })
    );
    assert!(matches!(
        MemoryStore::open("  ", 1),
        Err(StoreOpenError::EmptyName)
    ));
    assert!(matches!(
        MemoryStore::open("db", 0),
        Err(StoreOpenError::InvalidVersion)
    ));
}

#[tokio::test]
async fn missing_index_and_bad_bounds_are_invariant_violations() {
    let store = MemoryStore::open("legacy", 1).expect("v1 store should open");

    let err = store
        .open_cursor(CursorRequest::index(IndexName::Score, Direction::Asc))
        .await
        .err()
        .expect("score index is not present at v1");
    assert_eq!(err, StoreAccessError::UnknownIndex(IndexName::Score));
    assert_eq!(
        InternalError::from(err).class,
        ErrorClass::InvariantViolation
    );

    let err = store
        .open_cursor(CursorRequest {
            source: ScanSource::Index(IndexName::Name),
            direction: Direction::Asc,
            start: ScanStart::AfterKey(RecordId::new(1)),
        })
        .await
        .err()
        .expect("key bound on an index scan should fail");
    assert_eq!(err, StoreAccessError::InvalidBound(IndexName::Name));
    assert!(!InternalError::from(err).is_retryable());
}
