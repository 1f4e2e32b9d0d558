
use super::*;
use crate::{
    db::{
        direction::Direction,
        query::{QueryMode, ScanStrategy, SearchTerm, SortSpec},
        store::RecordStore,
    },
    error::ErrorClass,
    model::{IndexName, Record},
    test_support::{FlakyStore, handle, memory_store, numbered_records, record, scenario_records},
    types::RecordId,
};
use std::sync::Arc;

fn names(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().map(|r| r.id.get()).collect()
}

#[tokio::test]
async fn sorted_scan_pages_by_ordinal_offset() {
    let store = handle(scenario_records()).await;
    let strategy = ScanStrategy::index(IndexName::Name, Direction::Asc);

    let page1 = fetch_page(store.as_ref(), strategy, ResumeToken::Start, None, 2)
        .await
        .expect("first sorted page should fetch");
    assert_eq!(names(&page1.records), vec!["Ann", "Bob"]);
    assert_eq!(page1.next_token, ResumeToken::Offset(2));
    assert!(!page1.exhausted, "a full page never claims exhaustion");

    let page2 = fetch_page(store.as_ref(), strategy, page1.next_token, None, 2)
        .await
        .expect("second sorted page should fetch");
    assert_eq!(names(&page2.records), vec!["Cara"]);
    assert_eq!(page2.next_token, ResumeToken::Offset(3));
    assert!(page2.exhausted);
}

#[tokio::test]
async fn search_scan_visits_every_record_and_counts_only_matches() {
    let store = handle(scenario_records()).await;
    let search = |r: &Record| r.matches_search("an");

    let page = fetch_page(
        store.as_ref(),
        ScanStrategy::FULL_SCAN,
        ResumeToken::Start,
        Some(&search),
        30,
    )
    .await
    .expect("search page should fetch");

    assert_eq!(names(&page.records), vec!["Ann"]);
    assert!(page.exhausted);
    assert_eq!(page.visited, 3, "search must test every record");
    assert_eq!(
        page.next_token,
        ResumeToken::AfterKey(RecordId::new(3)),
        "rejected records still advance the primary-key bound"
    );
}

#[tokio::test]
async fn primary_scan_resumes_after_last_consumed_key() {
    let store = handle(numbered_records(10)).await;
    let even = |r: &Record| r.id.get() % 2 == 0;

    let page1 = fetch_page(
        store.as_ref(),
        ScanStrategy::FULL_SCAN,
        ResumeToken::Start,
        Some(&even),
        2,
    )
    .await
    .expect("first filtered page should fetch");
    assert_eq!(ids(&page1.records), vec![2, 4]);
    assert_eq!(page1.next_token, ResumeToken::AfterKey(RecordId::new(4)));

    let page2 = fetch_page(
        store.as_ref(),
        ScanStrategy::FULL_SCAN,
        page1.next_token,
        Some(&even),
        2,
    )
    .await
    .expect("second filtered page should fetch");
    assert_eq!(ids(&page2.records), vec![6, 8]);
}

#[tokio::test]
async fn page_ending_exactly_at_the_end_reports_exhaustion_on_the_next_call() {
    let store = handle(numbered_records(4)).await;

    let page1 = fetch_page(
        store.as_ref(),
        ScanStrategy::FULL_SCAN,
        ResumeToken::Start,
        None,
        4,
    )
    .await
    .expect("full page should fetch");
    assert_eq!(page1.records.len(), 4);
    assert!(!page1.exhausted);

    let page2 = fetch_page(
        store.as_ref(),
        ScanStrategy::FULL_SCAN,
        page1.next_token,
        None,
        4,
    )
    .await
    .expect("trailing page should fetch");
    assert!(page2.records.is_empty());
    assert!(page2.exhausted);
    assert_eq!(
        page2.next_token, page1.next_token,
        "an empty page keeps the token"
    );
}

#[tokio::test]
async fn empty_store_is_exhausted_immediately() {
    let store = handle(Vec::new()).await;

    let page = fetch_page(
        store.as_ref(),
        ScanStrategy::index(IndexName::Score, Direction::Desc),
        ResumeToken::Start,
        None,
        30,
    )
    .await
    .expect("empty store should fetch");

    assert!(page.records.is_empty());
    assert!(page.exhausted);
    assert_eq!(page.next_token, ResumeToken::Start);
}

#[tokio::test]
async fn offset_token_equals_fresh_scan_minus_skipped_prefix() {
    let store = handle(numbered_records(25)).await;
    let strategy = ScanStrategy::index(IndexName::Score, Direction::Desc);

    let all = fetch_page(store.as_ref(), strategy, ResumeToken::Start, None, 25)
        .await
        .expect("full scan should fetch");
    let resumed = fetch_page(store.as_ref(), strategy, ResumeToken::Offset(7), None, 25)
        .await
        .expect("resumed scan should fetch");

    assert_eq!(resumed.records, all.records[7..].to_vec());
}

#[tokio::test]
async fn refetching_with_the_same_token_is_identical() {
    let store = handle(numbered_records(40)).await;
    let strategy = ScanStrategy::index(IndexName::Name, Direction::Asc);

    let first = fetch_page(store.as_ref(), strategy, ResumeToken::Offset(10), None, 15)
        .await
        .expect("first fetch should succeed");
    let second = fetch_page(store.as_ref(), strategy, ResumeToken::Offset(10), None, 15)
        .await
        .expect("second fetch should succeed");

    assert_eq!(first, second);
}

#[tokio::test]
async fn ascending_scan_sees_appends_exactly_once() {
    let store = memory_store(numbered_records(5)).await;

    let mut token = ResumeToken::Start;
    let mut seen = Vec::new();
    let page = fetch_page(store.as_ref(), ScanStrategy::FULL_SCAN, token, None, 3)
        .await
        .expect("first page should fetch");
    seen.extend(ids(&page.records));
    token = page.next_token;

    // The seeder appends while the reader is between pages.
    store
        .put_batch((6..=8).map(|id| record(id, "Late", 1)).collect())
        .await
        .expect("append should succeed");

    loop {
        let page = fetch_page(store.as_ref(), ScanStrategy::FULL_SCAN, token, None, 3)
            .await
            .expect("page should fetch");
        seen.extend(ids(&page.records));
        token = page.next_token;
        if page.exhausted {
            break;
        }
    }

    assert_eq!(seen, (1..=8).collect::<Vec<_>>());
}

#[tokio::test]
async fn store_failure_returns_no_partial_page() {
    let flaky = Arc::new(FlakyStore::new(handle(numbered_records(5)).await));
    flaky.set_failing(true);

    let err = fetch_page(
        flaky.as_ref(),
        ScanStrategy::FULL_SCAN,
        ResumeToken::AfterKey(RecordId::new(2)),
        None,
        2,
    )
    .await
    .expect_err("injected failure should surface");
    assert_eq!(err.class, ErrorClass::StoreAccess);
    assert!(err.is_retryable());

    flaky.set_failing(false);
    let page = fetch_page(
        flaky.as_ref(),
        ScanStrategy::FULL_SCAN,
        ResumeToken::AfterKey(RecordId::new(2)),
        None,
        2,
    )
    .await
    .expect("retry with the unchanged token should succeed");
    assert_eq!(ids(&page.records), vec![3, 4]);
}

#[tokio::test]
async fn zero_page_size_and_mismatched_tokens_are_invariant_violations() {
    let store = handle(numbered_records(3)).await;

    let err = fetch_page(
        store.as_ref(),
        ScanStrategy::FULL_SCAN,
        ResumeToken::Start,
        None,
        0,
    )
    .await
    .expect_err("zero page size should be rejected");
    assert_eq!(err.class, ErrorClass::InvariantViolation);

    let err = fetch_page(
        store.as_ref(),
        ScanStrategy::FULL_SCAN,
        ResumeToken::Offset(1),
        None,
        5,
    )
    .await
    .expect_err("offset token on a primary scan should be rejected");
    assert!(err.is_fatal());
}

#[tokio::test]
async fn execute_plans_from_the_request() {
    let store = handle(scenario_records()).await;

    let sorted = FetchRequest::new(
        SortSpec::asc(IndexName::Name),
        SearchTerm::default(),
        ResumeToken::Start,
        2,
    );
    assert_eq!(sorted.mode, QueryMode::Sorted);
    let response = execute(store.as_ref(), &sorted)
        .await
        .expect("sorted request should execute");
    assert_eq!(names(&response.records), vec!["Ann", "Bob"]);
    assert_eq!(response.resume_token, ResumeToken::Offset(2));
    assert!(!response.exhausted);

    let search = FetchRequest::new(
        SortSpec::asc(IndexName::Name),
        SearchTerm::new(" AN "),
        ResumeToken::Start,
        30,
    );
    assert_eq!(search.mode, QueryMode::Searching);
    let response = execute(store.as_ref(), &search)
        .await
        .expect("search request should execute");
    assert_eq!(names(&response.records), vec!["Ann"]);
    assert!(response.exhausted);
}

#[tokio::test]
async fn execute_rejects_inconsistent_mode() {
    let store = handle(scenario_records()).await;
    let mut request = FetchRequest::new(
        SortSpec::NONE,
        SearchTerm::default(),
        ResumeToken::Start,
        10,
    );
    request.mode = QueryMode::Searching;

    let err = execute(store.as_ref(), &request)
        .await
        .expect_err("searching without a term should be rejected");
    assert_eq!(err.class, ErrorClass::InvariantViolation);
}

#[tokio::test]
async fn sorting_on_an_index_the_store_lacks_is_fatal() {
    let legacy: Arc<dyn RecordStore> = Arc::new(
        crate::db::store::MemoryStore::open("legacy", 1).expect("v1 store should open"),
    );

    let err = fetch_page(
        legacy.as_ref(),
        ScanStrategy::index(IndexName::Score, Direction::Asc),
        ResumeToken::Start,
        None,
        10,
    )
    .await
    .expect_err("score index is missing at v1");
    assert!(err.is_fatal());
    assert!(!err.is_retryable());
}

#[test]
fn fetch_request_round_trips_through_json() {
    let request = FetchRequest::new(
        SortSpec::desc(IndexName::Score),
        SearchTerm::default(),
        ResumeToken::Offset(60),
        30,
    );

    let json = serde_json::to_value(&request).expect("request should serialize");
    assert_eq!(json["mode"], "sorted");
    assert_eq!(json["sortKey"], "score");
    assert_eq!(json["sortDirection"], "desc");
    assert_eq!(json["resumeToken"]["kind"], "offset");
    assert_eq!(json["resumeToken"]["at"], 60);

    let back: FetchRequest = serde_json::from_value(json).expect("request should deserialize");
    assert_eq!(back, request);
}

#[tokio::test]
async fn oversized_page_size_returns_what_the_store_holds() {
    let store = handle(scenario_records()).await;
    let request = FetchRequest::new(
        SortSpec::NONE,
        SearchTerm::default(),
        ResumeToken::Start,
        u32::MAX,
    );

    let response = execute(store.as_ref(), &request)
        .await
        .expect("oversized page should execute");

    assert_eq!(ids(&response.records), vec![1, 2, 3]);
    assert_eq!(response.resume_token, ResumeToken::AfterKey(RecordId::new(3)));
    assert!(response.exhausted);
}
