/// Forwards `log` crate records emitted by dependencies into the tagged logger
use super::{levels::LogLevel, tags::LogTag};

struct LogBridge;

static BRIDGE: LogBridge = LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
            || super::core::should_log(&LogTag::System, LogLevel::Verbose)
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Dependency chatter below warnings only shows with --verbose
        let level = match LogLevel::from(record.level()) {
            level @ (LogLevel::Error | LogLevel::Warning) => level,
            _ => LogLevel::Verbose,
        };
        super::core::log_internal(
            LogTag::System,
            level,
            &format!("{}: {}", record.target(), record.args()),
        );
    }

    fn flush(&self) {
        super::file::flush_file_logging();
    }
}

/// Install the bridge; a second call is a no-op
pub fn install() {
    if log::set_logger(&BRIDGE).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}
