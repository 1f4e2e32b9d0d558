//! Runtime configuration.
//!
//! Every section deserializes with defaults for missing fields, so a partial
//! JSON document (or none at all) yields a working setup.

use crate::db::store::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
}

///
/// RowscanConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RowscanConfig {
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub seed: SeedConfig,
    pub viewport: ViewportConfig,
}

impl RowscanConfig {
    /// Reject settings that would fail every fetch or seeding batch later.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.session.page_size == 0 {
            return Err(ConfigError::Zero {
                field: "session.page_size",
            });
        }
        if self.seed.batch_size == 0 {
            return Err(ConfigError::Zero {
                field: "seed.batch_size",
            });
        }

        Ok(())
    }
}

///
/// StoreConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub schema_version: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "CustomerDatabase".to_string(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

///
/// SessionConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Matching records collected per fetch.
    pub page_size: u32,

    /// Quiet period after the last search keystroke before querying.
    pub debounce_ms: u64,

    /// Distance from the bottom of the scroll area that counts as "near".
    pub near_bottom_px: u32,
}

impl SessionConfig {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: crate::DEFAULT_PAGE_SIZE,
            debounce_ms: 250,
            near_bottom_px: 200,
        }
    }
}

///
/// SeedConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Store size the seeder fills up to.
    pub total_target: u64,

    /// Records written per transaction.
    pub batch_size: u32,

    /// Generator seed; the same seed always yields the same records.
    pub seed: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            total_target: 1_000_000,
            batch_size: 5_000,
            seed: 0x5EED,
        }
    }
}

///
/// ViewportConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub row_height: u32,
    pub overscan: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            row_height: 55,
            overscan: 5,
        }
    }
}
