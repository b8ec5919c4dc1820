/// Core logging implementation with automatic filtering
use super::config::{get_logger_config, is_debug_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Check against minimum log level threshold
/// 3. Debug level requires --debug-<tag> for that tag (or --verbose)
/// 4. Verbose level requires --verbose
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();
    if level > config.min_level {
        return false;
    }

    match level {
        LogLevel::Debug => is_debug_enabled_for_tag(tag),
        LogLevel::Verbose => config.min_level == LogLevel::Verbose,
        _ => true,
    }
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message);
}
