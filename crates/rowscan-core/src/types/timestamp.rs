use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error as ThisError;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// TimestampError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum TimestampError {
    #[error("timestamp parse error: {0}")]
    Parse(String),

    #[error("timestamp before epoch")]
    BeforeEpoch,

    #[error("timestamp out of range: {0} ms")]
    OutOfRange(u64),
}

///
/// Timestamp
/// (in milliseconds since the unix epoch)
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub const MILLIS_PER_DAY: u64 = 24 * 3_600 * 1_000;

    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Wall-clock now. Clocks set before the epoch collapse to `EPOCH`.
    #[must_use]
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

        Self(ms)
    }

    #[must_use]
    pub const fn saturating_sub_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_sub(ms))
    }

    pub fn parse_rfc3339(s: &str) -> Result<Self, TimestampError> {
        let dt = OffsetDateTime::parse(s.trim(), &Rfc3339)
            .map_err(|err| TimestampError::Parse(err.to_string()))?;
        let ms = dt.unix_timestamp_nanos() / 1_000_000;

        u64::try_from(ms).map(Self).map_err(|_| TimestampError::BeforeEpoch)
    }

    pub fn to_rfc3339(self) -> Result<String, TimestampError> {
        let dt = self.to_datetime()?;

        dt.format(&Rfc3339)
            .map_err(|err| TimestampError::Parse(err.to_string()))
    }

    /// Calendar date (`YYYY-MM-DD`, UTC) used for table cells.
    pub fn date_string(self) -> Result<String, TimestampError> {
        Ok(self.to_datetime()?.date().to_string())
    }

    fn to_datetime(self) -> Result<OffsetDateTime, TimestampError> {
        let nanos = i128::from(self.0) * 1_000_000;

        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|_| TimestampError::OutOfRange(self.0))
    }
}
