//! Entity store
//!
//! Collections of JSON documents, each with its own lock, indexes, status
//! lifecycle and soft references.
//!
//! # Write path
//!
//! 1. Schema validation (strict, nothing coerced)
//! 2. Immutability, lifecycle and append-only guards (updates)
//! 3. Unique-index check
//! 4. Commit, index maintenance, link recording
//! 5. Advisory reference resolution (warn and count, never refuse)

mod collection;
mod engine;
mod errors;
mod snapshot;

pub use collection::CollectionDef;
pub use engine::EntityStore;
pub use errors::{StoreError, StoreResult};
pub use snapshot::data_dir_for;
