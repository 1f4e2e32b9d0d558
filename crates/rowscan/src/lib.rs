//! ## Crate layout
//! - `core`: record store, scan planning, paged fetching, query sessions,
//!   seeding and observability.
//!
//! The `prelude` module carries the vocabulary a table front end needs;
//! everything else is reached through `core` or the top-level re-exports.

pub use rowscan_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Re-exports
//

pub use core::{
    config::RowscanConfig,
    db::{
        Database,
        bootstrap::{StatusLine, StatusTracker, startup},
        session::{QuerySession, SessionDriver, SessionPhase},
    },
    error::{ErrorClass, InternalError},
    view::Viewport,
};

///
/// Prelude
///
/// Domain vocabulary plus the session entry points.
///

pub mod prelude {
    pub use crate::core::{
        db::session::{ApplyOutcome, PendingFetch, QuerySession, SessionDriver, SessionPhase},
        prelude::*,
    };
}
