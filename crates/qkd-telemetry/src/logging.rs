//! Structured logging helpers with consistent field names.

/// Log a per-session event tagged with the session number.
///
/// ```rust,ignore
/// qkd_telemetry::log_run_event!(info, 3, "Key delivered", key_bits = 256);
/// ```
#[macro_export]
macro_rules! log_run_event {
    ($level:ident, $run:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            run = $run,
            $($($field)*,)?
            $msg
        )
    };
}
