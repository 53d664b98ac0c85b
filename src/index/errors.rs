//! Index error types
//!
//! Error codes:
//! - TICKETING_INDEX_BUILD_FAILED (FATAL)
//! - TICKETING_DUPLICATE_INDEX (FATAL)
//!
//! Unique conflicts on the write path are not errors of the index itself;
//! they are reported as [`UniqueConflict`] and surfaced by the store.

use std::fmt;

use crate::schema::Severity;

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Existing documents violate a unique index being built
    IndexBuildFailed,
    /// An index with the same name is already declared
    DuplicateIndex,
}

impl IndexErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::IndexBuildFailed => "TICKETING_INDEX_BUILD_FAILED",
            IndexErrorCode::DuplicateIndex => "TICKETING_DUPLICATE_INDEX",
        }
    }

    /// All index errors are FATAL
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
    index: String,
}

impl IndexError {
    pub fn build_failed(index: impl Into<String>, reason: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            code: IndexErrorCode::IndexBuildFailed,
            message: format!("Index '{}' build failed: {}", index, reason.into()),
            index,
        }
    }

    pub fn duplicate_index(index: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            code: IndexErrorCode::DuplicateIndex,
            message: format!("Index '{}' is already declared", index),
            index,
        }
    }

    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the index involved
    pub fn index(&self) -> &str {
        &self.index
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// A unique index already holds the candidate key under another document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConflict {
    /// Indexed field(s), comma-joined for compound indexes
    pub field: String,
    /// The conflicting value, rendered as JSON
    pub value: String,
    /// `_id` of the document already holding the value
    pub conflicting_id: String,
}
