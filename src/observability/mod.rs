//! Observability for the entity store
//!
//! - Structured events through `tracing`, one line per event
//! - Monotonic counters
//!
//! Observability is read-only: nothing here changes the outcome of a write.
//!
//! # Usage
//!
//! ```ignore
//! use ticketing_store::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::SnapshotSaved, &[("collections", "10")]);
//! ```

mod events;
mod logging;
mod metrics;

pub use events::{Event, EventLevel};
pub use logging::init_logging;
pub use metrics::{MetricsSnapshot, RejectionKind, StoreMetrics};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with `key=value` fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let detail = render_fields(fields);
    match event.level() {
        EventLevel::Debug => tracing::debug!(event = event.as_str(), fields = %detail),
        EventLevel::Info => tracing::info!(event = event.as_str(), fields = %detail),
        EventLevel::Warn => tracing::warn!(event = event.as_str(), fields = %detail),
        EventLevel::Error => tracing::error!(event = event.as_str(), fields = %detail),
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}
