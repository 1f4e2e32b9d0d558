//! Record model and index vocabulary shared by the store, planner and session.

pub mod index;
pub mod record;


pub use index::{IndexName, IndexValue};
pub use record::Record;
