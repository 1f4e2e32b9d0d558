use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::IndexName,
    types::RecordId,
};
use thiserror::Error as ThisError;

///
/// StoreOpenError
///
/// Opening or upgrading the store failed. Fatal for the session: nothing
/// reopens the store automatically.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreOpenError {
    #[error("store name must not be empty")]
    EmptyName,

    #[error("schema version must be at least 1")]
    InvalidVersion,

    #[error("schema version {requested} is unknown (latest is {latest})")]
    UnknownVersion { requested: u32, latest: u32 },

    #[error("index '{index}' cannot be built: {reason}")]
    IndexBuild { index: IndexName, reason: String },
}

impl From<StoreOpenError> for InternalError {
    fn from(err: StoreOpenError) -> Self {
        Self::new(ErrorClass::StoreOpen, ErrorOrigin::Store, err.to_string())
    }
}

///
/// StoreAccessError
///
/// A read (count or cursor step) failed. Costs the caller one attempt; the
/// scan position it was resuming from is still valid.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreAccessError {
    #[error("store connection is closed")]
    Closed,

    #[error("cursor failed: {0}")]
    Cursor(String),

    #[error("store has no index '{0}'")]
    UnknownIndex(IndexName),

    #[error("key bound is not valid for a scan over index '{0}'")]
    InvalidBound(IndexName),
}

impl StoreAccessError {
    // Unknown indexes and bad bounds are caller bugs, not I/O failures.
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Closed | Self::Cursor(_) => ErrorClass::StoreAccess,
            Self::UnknownIndex(_) | Self::InvalidBound(_) => ErrorClass::InvariantViolation,
        }
    }

    pub(crate) const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Closed | Self::Cursor(_) => ErrorOrigin::Store,
            Self::UnknownIndex(_) | Self::InvalidBound(_) => ErrorOrigin::Index,
        }
    }
}

impl From<StoreAccessError> for InternalError {
    fn from(err: StoreAccessError) -> Self {
        Self::new(err.class(), err.origin(), err.to_string())
    }
}

///
/// StoreWriteError
///
/// A write batch was rejected. Batches are all-or-nothing: on error none of
/// the batch's records were stored.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreWriteError {
    #[error("store connection is closed")]
    Closed,

    #[error("record key exists: {0}")]
    KeyExists(RecordId),

    #[error("index constraint violation: {index} ({value})")]
    UniqueViolation { index: IndexName, value: String },
}

impl StoreWriteError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Closed => ErrorClass::StoreAccess,
            Self::KeyExists(_) | Self::UniqueViolation { .. } => ErrorClass::Conflict,
        }
    }
}

impl From<StoreWriteError> for InternalError {
    fn from(err: StoreWriteError) -> Self {
        let origin = match err {
            StoreWriteError::UniqueViolation { .. } => ErrorOrigin::Index,
            _ => ErrorOrigin::Store,
        };

        Self::new(err.class(), origin, err.to_string())
    }
}
