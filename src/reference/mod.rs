//! Soft cross-entity references
//!
//! Collections owned by different services point at each other through
//! bare identifier fields. Nothing here blocks a write: the linker records
//! references and resolution only reports whether a target exists.

mod linker;
mod soft_ref;

pub use linker::{EntityRef, Link, ReferenceField, ReferenceLinker};
pub use soft_ref::SoftRef;
