pub mod bootstrap;
pub mod direction;
pub mod executor;
pub mod query;
pub mod session;
pub mod store;

use crate::{
    config::StoreConfig,
    db::store::{MemoryStore, StoreHandle},
    error::InternalError,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

///
/// Database
///
/// Process-wide entry point to the record store. The store is opened on
/// first use and every later caller shares the same handle.
///

pub struct Database {
    config: StoreConfig,
    handle: OnceCell<StoreHandle>,
}

impl Database {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
        }
    }

    /// Wrap an already-open store.
    #[must_use]
    pub fn with_store(config: StoreConfig, store: StoreHandle) -> Self {
        Self {
            config,
            handle: OnceCell::new_with(Some(store)),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open the store once, returning the shared handle.
    pub async fn get_or_open(&self) -> Result<StoreHandle, InternalError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let store = MemoryStore::from_config(&self.config)?;
                tracing::info!(
                    store = %self.config.name,
                    version = self.config.schema_version,
                    "store opened"
                );

                Ok::<StoreHandle, InternalError>(Arc::new(store))
            })
            .await?;

        Ok(Arc::clone(handle))
    }
}
