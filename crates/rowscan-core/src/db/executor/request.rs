use crate::{
    db::{
        direction::Direction,
        executor::{ResumeToken, fetch_page},
        query::{QueryMode, ScanStrategy, SearchTerm, SortSpec, plan},
        store::{RecordStore, ScanSource},
    },
    error::InternalError,
    model::{IndexName, Record},
    obs::sink::{self, MetricsEvent, PlanKind},
};
use serde::{Deserialize, Serialize};

///
/// FetchRequest
///
/// Everything needed to fetch one page, independent of session state.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub mode: QueryMode,
    pub sort_key: Option<IndexName>,
    pub sort_direction: Direction,
    pub search_term: SearchTerm,
    pub resume_token: ResumeToken,
    pub page_size: u32,
}

impl FetchRequest {
    #[must_use]
    pub fn new(
        sort: SortSpec,
        search_term: SearchTerm,
        resume_token: ResumeToken,
        page_size: u32,
    ) -> Self {
        Self {
            mode: QueryMode::resolve(&sort, &search_term),
            sort_key: sort.key,
            sort_direction: sort.direction,
            search_term,
            resume_token,
            page_size,
        }
    }

    #[must_use]
    pub const fn sort(&self) -> SortSpec {
        SortSpec {
            key: self.sort_key,
            direction: self.sort_direction,
        }
    }

    /// Plan the scan, rejecting a `mode` that disagrees with the inputs.
    pub fn strategy(&self) -> Result<ScanStrategy, InternalError> {
        let resolved = QueryMode::resolve(&self.sort(), &self.search_term);
        if resolved != self.mode {
            return Err(InternalError::query_invariant(format!(
                "request mode '{}' does not match its inputs (resolves to '{resolved}')",
                self.mode
            )));
        }

        Ok(plan(self.sort(), self.search_term.is_active()))
    }
}

///
/// FetchResponse
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub records: Vec<Record>,
    pub resume_token: ResumeToken,
    pub exhausted: bool,
}

/// Plan and run one fetch request.
pub async fn execute(
    store: &dyn RecordStore,
    request: &FetchRequest,
) -> Result<FetchResponse, InternalError> {
    let strategy = request.strategy()?;
    sink::record(MetricsEvent::Plan {
        kind: match strategy.source {
            ScanSource::PrimaryKey => PlanKind::FullScan,
            ScanSource::Index(_) => PlanKind::Index,
        },
    });

    let needle = request.search_term.as_str();
    let search = |record: &Record| record.matches_search(needle);
    let predicate = request
        .search_term
        .is_active()
        .then_some(&search as &(dyn Fn(&Record) -> bool + Sync));

    let page = fetch_page(
        store,
        strategy,
        request.resume_token,
        predicate,
        request.page_size,
    )
    .await?;

    Ok(FetchResponse {
        records: page.records,
        resume_token: page.next_token,
        exhausted: page.exhausted,
    })
}
