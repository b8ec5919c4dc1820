/// Logger configuration
///
/// Stored process-wide so that any module can log without carrying a handle.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::PathBuf;

use super::levels::LogLevel;
use super::tags::LogTag;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped
    pub min_level: LogLevel,
    /// Tags with Debug output enabled
    pub debug_tags: HashSet<LogTag>,
    /// Optional file that receives a plain copy of every line
    pub log_file: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            log_file: None,
        }
    }
}

impl LoggerConfig {
    /// Build from `--debug-<tag>` style flags plus `--verbose`
    pub fn from_flags<'a>(debug_keys: impl IntoIterator<Item = &'a str>, verbose: bool) -> Self {
        let debug_tags: HashSet<LogTag> = debug_keys
            .into_iter()
            .filter_map(LogTag::from_debug_key)
            .collect();

        let min_level = if verbose {
            LogLevel::Verbose
        } else if !debug_tags.is_empty() {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        Self {
            min_level,
            debug_tags,
            log_file: None,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.min_level == LogLevel::Verbose || config.debug_tags.contains(tag)
}
