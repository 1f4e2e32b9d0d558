use crate::{
    db::{
        query::ScanStrategy,
        store::{CursorRequest, ScanSource, ScanStart},
    },
    error::InternalError,
    types::RecordId,
};
use serde::{Deserialize, Serialize};

///
/// ResumeToken
///
/// Where the next page of a scan starts. Opaque to callers: it is produced
/// by one fetch and handed back unchanged to the next.
///
/// - `AfterKey` is the last primary key a primary-key scan consumed
///   (exclusive bound).
/// - `Offset` is the number of index entries an index scan has consumed.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "camelCase")]
pub enum ResumeToken {
    #[default]
    Start,
    AfterKey(RecordId),
    Offset(u64),
}

impl ResumeToken {
    #[must_use]
    pub const fn is_start(&self) -> bool {
        matches!(self, Self::Start)
    }

    /// Cursor to open for `strategy` plus the entries to skip once opened.
    pub(crate) fn open_position(
        self,
        strategy: ScanStrategy,
    ) -> Result<(CursorRequest, u64), InternalError> {
        let direction = strategy.direction;

        match (strategy.source, self) {
            (ScanSource::PrimaryKey, Self::Start) => {
                Ok((CursorRequest::primary(direction, ScanStart::First), 0))
            }
            (ScanSource::PrimaryKey, Self::AfterKey(id)) => {
                Ok((CursorRequest::primary(direction, ScanStart::AfterKey(id)), 0))
            }
            (ScanSource::Index(index), Self::Start) => {
                Ok((CursorRequest::index(index, direction), 0))
            }
            (ScanSource::Index(index), Self::Offset(skip)) => {
                Ok((CursorRequest::index(index, direction), skip))
            }
            (source, token) => Err(InternalError::executor_invariant(format!(
                "resume token {token:?} does not fit a {source} scan"
            ))),
        }
    }

    /// Token after a page that consumed `visited` entries, the last being
    /// `last_key`.
    pub(crate) fn advanced(
        self,
        strategy: ScanStrategy,
        skip: u64,
        visited: u64,
        last_key: Option<RecordId>,
    ) -> Self {
        if visited == 0 {
            return self;
        }

        if strategy.uses_offset_tokens() {
            Self::Offset(skip.saturating_add(visited))
        } else {
            last_key.map_or(self, Self::AfterKey)
        }
    }
}
