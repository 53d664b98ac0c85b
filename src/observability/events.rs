//! Observable store events
//!
//! Every structured log line carries one of these names in its `event`
//! field. Names are stable and uppercase.

use std::fmt;

/// Observable events of the entity store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration & boot
    /// Configuration file loaded
    ConfigLoaded,
    /// Schemas loaded from disk
    SchemasLoaded,
    /// Schema registered in the registry
    SchemaRegistered,
    /// Collection declared on the store
    CollectionDeclared,
    /// Index declared and built
    IndexDeclared,
    /// Store ready for writes
    StoreOpened,

    // Writes
    /// Document inserted
    DocumentInserted,
    /// Document updated
    DocumentUpdated,
    /// Status field moved along its lifecycle
    StatusTransition,
    /// Write refused by a consistency check
    WriteRejected,
    /// Written document points at a missing target
    DanglingReference,

    // Persistence
    /// Snapshot written
    SnapshotSaved,
    /// Snapshot read and verified
    SnapshotLoaded,
    /// Snapshot could not be applied (FATAL)
    SnapshotLoadFailed,
    /// Index rebuild begins
    IndexRebuildBegin,
    /// Index rebuild complete
    IndexRebuildComplete,
    /// Sample data written
    SeedApplied,
}

/// Severity an event is logged at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Event {
    /// Returns the event name as it appears in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::CollectionDeclared => "COLLECTION_DECLARED",
            Event::IndexDeclared => "INDEX_DECLARED",
            Event::StoreOpened => "STORE_OPENED",
            Event::DocumentInserted => "DOCUMENT_INSERTED",
            Event::DocumentUpdated => "DOCUMENT_UPDATED",
            Event::StatusTransition => "STATUS_TRANSITION",
            Event::WriteRejected => "WRITE_REJECTED",
            Event::DanglingReference => "DANGLING_REFERENCE",
            Event::SnapshotSaved => "SNAPSHOT_SAVED",
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotLoadFailed => "SNAPSHOT_LOAD_FAILED",
            Event::IndexRebuildBegin => "INDEX_REBUILD_BEGIN",
            Event::IndexRebuildComplete => "INDEX_REBUILD_COMPLETE",
            Event::SeedApplied => "SEED_APPLIED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SnapshotLoadFailed)
    }

    /// Level the event is logged at
    pub fn level(&self) -> EventLevel {
        match self {
            Event::SnapshotLoadFailed => EventLevel::Error,
            Event::WriteRejected | Event::DanglingReference => EventLevel::Warn,
            Event::DocumentInserted
            | Event::DocumentUpdated
            | Event::StatusTransition
            | Event::SchemaRegistered
            | Event::IndexDeclared
            | Event::CollectionDeclared => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_uppercase() {
        let events = [
            Event::ConfigLoaded,
            Event::DocumentInserted,
            Event::DanglingReference,
            Event::SnapshotLoadFailed,
        ];
        for event in events {
            let name = event.as_str();
            assert_eq!(name, name.to_uppercase());
            assert_eq!(event.to_string(), name);
        }
    }

    #[test]
    fn test_only_load_failure_is_fatal() {
        assert!(Event::SnapshotLoadFailed.is_fatal());
        assert!(!Event::WriteRejected.is_fatal());
        assert_eq!(Event::DanglingReference.level(), EventLevel::Warn);
    }
}
