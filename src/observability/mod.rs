//! Observability subsystem
//!
//! - Structured logging through `tracing`, one event per line
//! - Every event carries an `event` field from [`Event`]
//! - Counters in [`MetricsRegistry`], exposed at `/api/v1/metrics`
//!
//! # Usage
//!
//! ```ignore
//! use africa_energy_api::observability::{init_logging, Event, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//! tracing::info!(event = %Event::Serving, addr = "0.0.0.0:8000", "Serving");
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per line
    Json,
}

/// Accepted values for the configured log level
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Returns false if a subscriber
/// was already installed; observability setup never fails the process.
pub fn init_logging(level: &str, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .try_init(),
    };

    result.is_ok()
}
