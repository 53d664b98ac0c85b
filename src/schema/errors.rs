//! Schema error types
//!
//! Error codes:
//! - TICKETING_SCHEMA_VIOLATION (REJECT)
//! - TICKETING_UNKNOWN_ENTITY_TYPE (FATAL)
//! - TICKETING_SCHEMA_IMMUTABLE (REJECT)
//! - TICKETING_MALFORMED_SCHEMA (FATAL)

use std::fmt;

/// Severity levels shared by every store error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Write rejected, caller may recover
    Reject,
    /// Registry or data misconfiguration, caller should abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Document violates its entity schema
    SchemaViolation,
    /// No schema registered for the entity type
    UnknownEntityType,
    /// Attempt to replace a registered schema
    SchemaImmutable,
    /// Schema definition or schema file is unusable
    MalformedSchema,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SchemaViolation => "TICKETING_SCHEMA_VIOLATION",
            SchemaErrorCode::UnknownEntityType => "TICKETING_UNKNOWN_ENTITY_TYPE",
            SchemaErrorCode::SchemaImmutable => "TICKETING_SCHEMA_IMMUTABLE",
            SchemaErrorCode::MalformedSchema => "TICKETING_MALFORMED_SCHEMA",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::UnknownEntityType | SchemaErrorCode::MalformedSchema => {
                Severity::Fatal
            }
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The offending field and why it was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field path (e.g., "tripDetails.tripId", "intermediateStops[2].stopId")
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "required field is missing")
    }

    pub fn undeclared_field(field: impl Into<String>) -> Self {
        Self::new(field, "field is not declared by the schema")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::new(field, format!("expected {}, got {}", expected, actual))
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "null values are not allowed")
    }

    pub fn not_in_enum(field: impl Into<String>, value: &str, allowed: &[String]) -> Self {
        Self::new(
            field,
            format!("'{}' is not one of [{}]", value, allowed.join(", ")),
        )
    }

    pub fn pattern_mismatch(field: impl Into<String>, pattern: &str) -> Self {
        Self::new(field, format!("value does not match pattern '{}'", pattern))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': {}", self.field, self.reason)
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    entity_type: Option<String>,
    violation: Option<Violation>,
}

impl SchemaError {
    /// Create a schema violation error
    pub fn violation(entity_type: impl Into<String>, violation: Violation) -> Self {
        let entity = entity_type.into();
        Self {
            code: SchemaErrorCode::SchemaViolation,
            message: format!("'{}' document rejected: {}", entity, violation),
            entity_type: Some(entity),
            violation: Some(violation),
        }
    }

    /// Create an unknown entity type error
    pub fn unknown_entity_type(entity_type: impl Into<String>) -> Self {
        let entity = entity_type.into();
        Self {
            code: SchemaErrorCode::UnknownEntityType,
            message: format!("No schema registered for entity type '{}'", entity),
            entity_type: Some(entity),
            violation: None,
        }
    }

    /// Create a schema immutable error
    pub fn schema_immutable(entity_type: impl Into<String>, version: &str) -> Self {
        let entity = entity_type.into();
        Self {
            code: SchemaErrorCode::SchemaImmutable,
            message: format!("Schema '{}' version '{}' is already registered", entity, version),
            entity_type: Some(entity),
            violation: None,
        }
    }

    /// Create an error for a malformed schema definition or file
    pub fn malformed_schema(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MalformedSchema,
            message: format!("Malformed schema '{}': {}", source.into(), reason.into()),
            entity_type: None,
            violation: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the entity type if applicable
    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    /// Returns the violation if this is a schema violation
    pub fn details(&self) -> Option<&Violation> {
        self.violation.as_ref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
