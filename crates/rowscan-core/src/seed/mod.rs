//! Module: seed
//! Responsibility: fill the store with synthetic records in the background.
//! Does not own: deciding whether to seed (bootstrap) or reading records.

mod generator;


pub use generator::RecordGenerator;

use crate::{
    config::SeedConfig,
    db::store::StoreHandle,
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    types::Timestamp,
};
use tokio::{sync::mpsc, task::JoinHandle};

///
/// SeedProgress
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SeedProgress {
    /// A batch committed; `added` is the store size reached so far.
    Added { added: u64 },

    /// Seeding reached its target.
    Done,

    /// A batch failed; no further batches are written.
    Failed { message: String },
}

///
/// Seeder
///
/// Appends records in ascending id order, one transaction per batch, and
/// yields between batches so concurrent readers keep making progress.
///

#[derive(Clone, Copy, Debug)]
pub struct Seeder {
    generator: RecordGenerator,
    batch_size: u32,
}

impl Seeder {
    #[must_use]
    pub const fn new(generator: RecordGenerator, batch_size: u32) -> Self {
        Self {
            generator,
            batch_size,
        }
    }

    #[must_use]
    pub fn from_config(config: &SeedConfig) -> Self {
        Self::new(
            RecordGenerator::new(config.seed, Timestamp::now()),
            config.batch_size,
        )
    }

    /// Spawn the seeding task, continuing from `from_offset` up to `total`.
    #[must_use]
    pub fn start(self, store: StoreHandle, from_offset: u64, total: u64) -> SeedHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let last = match self.run(&store, from_offset, total, &tx).await {
                Ok(()) => SeedProgress::Done,
                Err(err) => {
                    tracing::warn!(error = %err.display_with_class(), "seeding stopped");
                    SeedProgress::Failed {
                        message: err.display_with_class(),
                    }
                }
            };
            let _ = tx.send(last);
        });

        SeedHandle { progress: rx, task }
    }

    async fn run(
        self,
        store: &StoreHandle,
        from_offset: u64,
        total: u64,
        tx: &mpsc::UnboundedSender<SeedProgress>,
    ) -> Result<(), InternalError> {
        if self.batch_size == 0 {
            return Err(InternalError::seed_internal("batch size must be at least 1"));
        }

        let mut offset = from_offset;
        tracing::info!(store = store.name(), from = offset, total, "seeding started");

        while offset < total {
            let count = (total - offset).min(u64::from(self.batch_size));
            store.put_batch(self.generator.batch(offset, count)).await?;
            offset += count;

            sink::record(MetricsEvent::SeedBatch { rows: count });
            tracing::info!(added = offset, total, "seed batch committed");

            // Progress is advisory; seeding continues without a listener.
            let _ = tx.send(SeedProgress::Added { added: offset });
            tokio::task::yield_now().await;
        }

        tracing::info!(store = store.name(), total, "seeding finished");

        Ok(())
    }
}

///
/// SeedHandle
///

pub struct SeedHandle {
    progress: mpsc::UnboundedReceiver<SeedProgress>,
    task: JoinHandle<()>,
}

impl SeedHandle {
    /// Next progress event; `None` once the final event has been taken.
    pub async fn next(&mut self) -> Option<SeedProgress> {
        self.progress.recv().await
    }

    /// Non-blocking variant of `next`.
    pub fn try_next(&mut self) -> Option<SeedProgress> {
        self.progress.try_recv().ok()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the terminal event, discarding intermediate progress.
    pub async fn finish(mut self) -> SeedProgress {
        let mut last = SeedProgress::Failed {
            message: "seeding task ended without reporting".to_string(),
        };
        while let Some(event) = self.next().await {
            last = event;
        }

        last
    }
}
