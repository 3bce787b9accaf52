//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to log events
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or full directive
    pub log_level: String,

    /// Whether to write events to stderr
    pub console_output: bool,

    /// Whether to write JSON lines instead of pretty output
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "qkd".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: qkd)
    /// - `QKD_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `QKD_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `QKD_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "qkd".to_string()),

            log_level: env::var("QKD_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: parse_flag(env::var("QKD_CONSOLE_OUTPUT").ok().as_deref(), true),

            json_logs: parse_flag(env::var("QKD_JSON_LOGS").ok().as_deref(), false),
        }
    }

    /// Override the level filter, e.g. from a `--log-level` flag.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Override JSON output.
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// `true`/`1` and `false`/`0`, case-insensitive; anything else keeps `default`.
fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(str::to_lowercase).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}
