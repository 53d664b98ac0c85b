//! CLI-specific error types
//!
//! Every CLI error ends the process with exit code 1.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::schema::SchemaError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("data directory {} is already initialized", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("data directory {} is not initialized; run 'ticketing-store init' first", .0.display())]
    NotInitialized(PathBuf),

    #[error("{0}")]
    Input(String),
}

impl CliError {
    /// Stable error code; store and schema errors keep their own
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "TICKETING_CLI_CONFIG_ERROR",
            CliError::Io(_) => "TICKETING_CLI_IO_ERROR",
            CliError::Json(_) | CliError::Input(_) => "TICKETING_CLI_BAD_INPUT",
            CliError::Schema(e) => e.code().code(),
            CliError::Store(e) => e.code(),
            CliError::AlreadyInitialized(_) => "TICKETING_CLI_ALREADY_INITIALIZED",
            CliError::NotInitialized(_) => "TICKETING_CLI_NOT_INITIALIZED",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
