//! Module: executor::fetch
//! Responsibility: run one bounded scan and assemble one page.
//! Does not own: choosing the scan (planner) or applying the page (session).

use crate::{
    db::{
        executor::ResumeToken,
        query::ScanStrategy,
        store::{CursorRequest, RecordStore},
    },
    error::InternalError,
    model::Record,
    obs::sink::{self, MetricsEvent},
    types::RecordId,
};

// Pages are usually small; large page sizes grow on demand instead.
const MAX_PAGE_PREALLOC: usize = 256;

/// Row predicate evaluated while scanning.
pub type RowPredicate<'a> = &'a (dyn Fn(&Record) -> bool + Sync);

///
/// FetchedPage
///
/// One page of matching records plus the position to resume from.
/// `exhausted` is only set when the cursor ran out, never because the page
/// filled up.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchedPage {
    pub records: Vec<Record>,
    pub next_token: ResumeToken,
    pub exhausted: bool,
    pub visited: u64,
}

/// Fetch up to `page_size` records matching `predicate` from `token` on.
///
/// Chaining each call's `next_token` into the next call with the same
/// strategy and predicate visits every record exactly once. On error nothing
/// is returned and the caller's token is still valid.
pub async fn fetch_page(
    store: &dyn RecordStore,
    strategy: ScanStrategy,
    token: ResumeToken,
    predicate: Option<RowPredicate<'_>>,
    page_size: u32,
) -> Result<FetchedPage, InternalError> {
    if page_size == 0 {
        return Err(InternalError::executor_invariant(
            "page size must be at least 1",
        ));
    }

    let (request, skip) = token.open_position(strategy)?;
    let result = scan(store, request, skip, predicate, page_size).await;

    match &result {
        Ok(scanned) => {
            sink::record(MetricsEvent::FetchFinish {
                rows_visited: scanned.visited,
                rows_matched: scanned.records.len() as u64,
                exhausted: scanned.exhausted,
            });
            tracing::debug!(
                store = store.name(),
                %strategy,
                ?token,
                visited = scanned.visited,
                matched = scanned.records.len(),
                exhausted = scanned.exhausted,
                "page fetched"
            );
        }
        Err(err) => {
            sink::record(MetricsEvent::FetchFailed { class: err.class });
            tracing::warn!(
                store = store.name(),
                %strategy,
                ?token,
                error = %err.display_with_class(),
                "page fetch failed"
            );
        }
    }

    result.map(|scanned| FetchedPage {
        next_token: token.advanced(strategy, skip, scanned.visited, scanned.last_key),
        records: scanned.records,
        exhausted: scanned.exhausted,
        visited: scanned.visited,
    })
}

struct Scanned {
    records: Vec<Record>,
    exhausted: bool,
    visited: u64,
    last_key: Option<RecordId>,
}

async fn scan(
    store: &dyn RecordStore,
    request: CursorRequest,
    skip: u64,
    predicate: Option<RowPredicate<'_>>,
    page_size: u32,
) -> Result<Scanned, InternalError> {
    let page_size = page_size as usize;
    let mut cursor = store.open_cursor(request).await?;

    // Phase 1: move past entries earlier pages already consumed.
    if skip > 0 && cursor.advance(skip).await? < skip {
        return Ok(Scanned {
            records: Vec::new(),
            exhausted: true,
            visited: 0,
            last_key: None,
        });
    }

    // Phase 2: collect matches until the page fills or the cursor runs dry.
    let mut records = Vec::with_capacity(page_size.min(MAX_PAGE_PREALLOC));
    let mut visited = 0_u64;
    let mut last_key = None;
    let mut exhausted = false;

    while records.len() < page_size {
        let Some(record) = cursor.next().await? else {
            exhausted = true;
            break;
        };

        visited += 1;
        last_key = Some(record.id);
        if predicate.is_none_or(|matches| matches(&record)) {
            records.push(record);
        }
    }

    Ok(Scanned {
        records,
        exhausted,
        visited,
        last_key,
    })
}
