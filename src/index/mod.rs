//! Index Manager subsystem
//!
//! Indexes are derived, in-memory state kept in step with the documents of
//! one collection and rebuilt whenever documents are loaded from disk.
//!
//! # Invariants
//!
//! - Unique indexes are checked before a write commits, under the same
//!   collection lock as the commit
//! - Lookup-only indexes never reject a write
//! - Lookups return document ids in ascending order
//! - Documents missing an indexed field are not indexed by it

mod btree;
mod errors;
mod manager;

pub use btree::{CompositeKey, IndexKey, IndexTree};
pub use errors::{IndexError, IndexErrorCode, IndexResult, UniqueConflict};
pub use manager::{IndexManager, IndexSpec};
