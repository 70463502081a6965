//! Logging infrastructure for deltalux
//!
//! Centralized tracing setup so hosts embedding a group can pick an
//! output profile without wiring subscribers themselves.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No output - for hosts that install their own subscriber
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose diagnostics with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode
///
/// Call early in the host's lifecycle, before spawning any group
/// workers that might generate log output.
///
/// # Environment Variables
///
/// - `DELTALUX_LOG_LEVEL`: Override log level (error, warn, info, debug, trace)
/// - `RUST_LOG`: Standard fallback filter
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info");

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))?;

            Ok(())
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug");

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))?;

            Ok(())
        }
    }
}

/// Initialize logging from environment variables
///
/// Reads `DELTALUX_LOG_MODE`:
/// - "development" -> LoggingMode::Development
/// - "debug" -> LoggingMode::Debug
///
/// Defaults to Silent if unset or invalid.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("DELTALUX_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };

    init_logging(mode)
}

/// Create an environment filter with fallback to a default level
fn create_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("DELTALUX_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

/// Check if logging has been initialized
///
/// Useful to avoid double-initialization in larger hosts.
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
