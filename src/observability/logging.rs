//! Subscriber setup for the binary
//!
//! Log lines go to stderr so stdout stays reserved for CLI responses.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, StoreConfig};

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Calling it twice keeps the first subscriber.
pub fn init_logging(config: &StoreConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(
            level = %config.log_level,
            format = ?config.log_format,
            "logging initialized"
        );
    }
}
