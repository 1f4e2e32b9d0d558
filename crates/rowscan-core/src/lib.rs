//! Core engine for rowscan: the record store, scan planning, paged fetching,
//! query sessions, background seeding and the types they share.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod seed;
pub mod types;
pub mod view;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Records collected per fetch unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, stores, or seeding machinery are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            direction::Direction,
            query::{FilterSpec, QueryMode, SearchTerm, SortSpec},
        },
        model::{IndexName, Record},
        types::{RecordId, Timestamp},
    };
}
