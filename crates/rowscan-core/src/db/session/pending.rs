use crate::{
    db::{
        executor::{FetchRequest, FetchResponse, execute},
        session::Generation,
        store::RecordStore,
    },
    error::InternalError,
};

///
/// PendingFetch
///
/// A fetch the session has committed to. The caller runs it against the
/// store and hands the outcome back through `QuerySession::apply`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingFetch {
    pub generation: Generation,
    pub request: FetchRequest,
}

impl PendingFetch {
    pub async fn run(self, store: &dyn RecordStore) -> FetchOutcome {
        let result = execute(store, &self.request).await;

        FetchOutcome {
            generation: self.generation,
            result,
        }
    }
}

///
/// FetchOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchOutcome {
    pub generation: Generation,
    pub result: Result<FetchResponse, InternalError>,
}
