//! Schema registry subsystem
//!
//! Schemas are first-class artifacts enforced on every write.
//!
//! # Design Principles
//!
//! - One immutable schema per entity type
//! - Validation is a pure check, run before any index or storage work
//! - No nulls, defaults, or coercion
//! - Deterministic: the first violation in field-name order is reported

mod errors;
mod registry;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity, Violation};
pub use registry::{schema_dir_for, SchemaRegistry};
pub use types::{FieldDef, FieldType, Schema};
pub use validator::SchemaValidator;
