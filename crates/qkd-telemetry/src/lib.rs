//! # QKD Telemetry
//!
//! Log subscriber setup for binaries built on `qkd-bb84`. Library crates only
//! emit `tracing` events; installing a subscriber is left to the binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qkd_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Protocol runs now log through the installed subscriber
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `qkd` | Service name attached to the startup event |
//! | `QKD_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `QKD_CONSOLE_OUTPUT` | `true` | Write events to stderr |
//! | `QKD_JSON_LOGS` | `false` | JSON lines instead of pretty output |

#![warn(missing_docs)]

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Install the global log subscriber described by `config`.
///
/// Fails if a subscriber is already set; call once at startup.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        log_level = %config.log_level,
        "Telemetry initialized"
    );
    Ok(())
}
