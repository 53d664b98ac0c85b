//! Store error types
//!
//! Every variant has a stable code and a severity:
//! - REJECT: the write was refused and nothing changed
//! - FATAL: the store or its inputs are misconfigured or corrupt

use std::path::PathBuf;

use thiserror::Error;

use crate::index::IndexError;
use crate::observability::RejectionKind;
use crate::schema::{SchemaError, SchemaErrorCode, Severity, Violation};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Document does not conform to its schema
    #[error("{0}")]
    Schema(SchemaError),

    #[error("{entity}.{field} value {value} is already held by '{conflicting_id}'")]
    UniquenessViolation {
        entity: String,
        field: String,
        value: String,
        conflicting_id: String,
    },

    #[error("{entity} '{id}' is in terminal state {current_state}; refusing change to {attempted}")]
    TerminalStateViolation {
        entity: String,
        id: String,
        current_state: String,
        attempted: String,
    },

    #[error("{entity} '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    #[error("{entity} '{id}' cannot start in state {state}")]
    InvalidInitialState {
        entity: String,
        id: String,
        state: String,
    },

    #[error("{entity} has no status lifecycle")]
    NoLifecycle { entity: String },

    #[error("{entity} '{id}': {field} is append-only; existing entries cannot change")]
    AppendOnlyViolation {
        entity: String,
        id: String,
        field: String,
    },

    #[error("{entity} '{id}': {field} is fixed at insert and cannot change")]
    ImmutableField {
        entity: String,
        id: String,
        field: String,
    },

    #[error("{entity} documents are immutable; '{id}' cannot be updated")]
    ImmutableDocument { entity: String, id: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    #[error("unknown entity type '{entity}'")]
    UnknownEntityType { entity: String },

    #[error("collection '{entity}' is already declared")]
    CollectionExists { entity: String },

    #[error("{0}")]
    Index(#[from] IndexError),

    #[error("snapshot {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },

    /// A typed record did not convert to or from its stored form
    #[error("record encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<SchemaError> for StoreError {
    fn from(err: SchemaError) -> Self {
        if err.code() == SchemaErrorCode::UnknownEntityType {
            StoreError::UnknownEntityType {
                entity: err.entity_type().unwrap_or_default().to_string(),
            }
        } else {
            StoreError::Schema(err)
        }
    }
}

impl StoreError {
    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        StoreError::UnknownEntityType {
            entity: entity.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn snapshot(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StoreError::Snapshot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Schema(e) => e.code().code(),
            StoreError::UniquenessViolation { .. } => "TICKETING_UNIQUENESS_VIOLATION",
            StoreError::TerminalStateViolation { .. } => "TICKETING_TERMINAL_STATE",
            StoreError::InvalidTransition { .. } => "TICKETING_INVALID_TRANSITION",
            StoreError::InvalidInitialState { .. } => "TICKETING_INVALID_INITIAL_STATE",
            StoreError::NoLifecycle { .. } => "TICKETING_NO_LIFECYCLE",
            StoreError::AppendOnlyViolation { .. } => "TICKETING_APPEND_ONLY",
            StoreError::ImmutableField { .. } => "TICKETING_IMMUTABLE_FIELD",
            StoreError::ImmutableDocument { .. } => "TICKETING_IMMUTABLE_DOCUMENT",
            StoreError::NotFound { .. } => "TICKETING_NOT_FOUND",
            StoreError::UnknownEntityType { .. } => "TICKETING_UNKNOWN_ENTITY_TYPE",
            StoreError::CollectionExists { .. } => "TICKETING_COLLECTION_EXISTS",
            StoreError::Index(e) => e.code().code(),
            StoreError::Snapshot { .. } => "TICKETING_SNAPSHOT_FAILED",
            StoreError::Encoding(_) => "TICKETING_ENCODING",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StoreError::Schema(e) => e.severity(),
            StoreError::Index(e) => e.severity(),
            StoreError::UnknownEntityType { .. }
            | StoreError::CollectionExists { .. }
            | StoreError::Snapshot { .. } => Severity::Fatal,
            _ => Severity::Reject,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Field and reason of a schema violation
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            StoreError::Schema(e) => e.details(),
            _ => None,
        }
    }

    /// Counter bucket for a refused write
    pub(crate) fn rejection_kind(&self) -> RejectionKind {
        match self {
            StoreError::Schema(_) => RejectionKind::Schema,
            StoreError::UniquenessViolation { .. } => RejectionKind::Uniqueness,
            StoreError::TerminalStateViolation { .. }
            | StoreError::InvalidTransition { .. }
            | StoreError::InvalidInitialState { .. } => RejectionKind::Lifecycle,
            _ => RejectionKind::Other,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
