//! Store configuration
//!
//! Loaded from a JSON file. Only `data_dir` is required:
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/ticketing",
//!   "log_level": "info",
//!   "log_format": "json",
//!   "ticket_direct_payment": true,
//!   "warn_on_dangling_references": true
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data directory (required)
    pub data_dir: PathBuf,

    /// Log filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Allow tickets to go from CREATED straight to PAID
    #[serde(default = "default_true")]
    pub ticket_direct_payment: bool,

    /// Log a warning when a write points at a missing document
    #[serde(default = "default_true")]
    pub warn_on_dangling_references: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl StoreConfig {
    /// Configuration with defaults for everything but the data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            ticket_direct_payment: true,
            warn_on_dangling_references: true,
        }
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: StoreConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }

        EnvFilter::try_new(&self.log_level).map_err(|e| {
            ConfigError::Invalid(format!("log_level '{}': {}", self.log_level, e))
        })?;

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        &self.data_dir
    }
}
