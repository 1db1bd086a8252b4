//! Logging infrastructure for the PSI pipeline.
//!
//! This module provides:
//! - The activity logger (`activity.log` in the output directory)
//! - Size-based rotation of the activity log
//! - Integration with the `tracing` ecosystem for stderr output
//!
//! # Example
//!
//! ```no_run
//! use psi_core::logging::{ActivityLogger, LogConfig};
//!
//! let logger = ActivityLogger::new("/data/whippet", LogConfig::default()).unwrap();
//!
//! logger.info("Starting run");
//! logger.phase("Quantify");
//! logger.command("julia whippet-quant.jl -x index reads.fq -o out/S1");
//! logger.success("Run completed");
//! ```

mod activity_logger;
mod types;

pub use activity_logger::{ActivityLogger, ACTIVITY_LOG_NAME};
pub use types::{LogConfig, LogLevel, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr through a non-blocking writer
///
/// Should be called once at application startup. Keep the returned guard
/// alive until exit so buffered lines are flushed.
pub fn init_tracing(default_level: LogLevel) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
