//! Structured, tagged logging for salesboard
//!
//! This module provides a small logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via `--debug-<tag>` flags
//! - Dual output: colored console + optional log file
//!
//! ## Usage
//!
//! ```rust
//! use salesboard::logger::{self, LogTag};
//!
//! logger::error(LogTag::Database, "Connection failed");
//! logger::info(LogTag::Webserver, "Listening on 127.0.0.1:5000");
//! logger::debug(LogTag::Metrics, "Cache hit"); // Only with --debug-metrics
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, before any logging occurs:
//! ```rust
//! use salesboard::logger::{self, LoggerConfig};
//!
//! logger::init(LoggerConfig::default());
//! ```

mod bridge;
mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Installs the configuration, opens the log file when one is configured and
/// routes `log` crate records from dependencies through this logger.
pub fn init(config: LoggerConfig) {
    if let Some(path) = config.log_file.as_deref() {
        file::init_file_logging(path);
    }
    set_logger_config(config);
    bridge::install();
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics)
///
/// Only shown when `--debug-<tag>` is provided for the tag, or with `--verbose`.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing, `--verbose` only)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Whether Debug output is enabled for a tag.
///
/// Use to skip building expensive debug messages.
pub fn is_debug_enabled(tag: LogTag) -> bool {
    core::should_log(&tag, LogLevel::Debug)
}

/// Force flush all pending log writes
///
/// Call this during shutdown to ensure all logs are written to disk.
pub fn flush() {
    file::flush_file_logging();
}
