/// Log tags identify the subsystem that emitted a message.
///
/// Each tag maps to a `--debug-<key>` command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Webserver,
    Api,
    Metrics,
    Database,
    Prompts,
}

impl LogTag {
    pub const ALL: [LogTag; 7] = [
        LogTag::System,
        LogTag::Config,
        LogTag::Webserver,
        LogTag::Api,
        LogTag::Metrics,
        LogTag::Database,
        LogTag::Prompts,
    ];

    /// Key used by `--debug-<key>` flags
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Webserver => "webserver",
            LogTag::Api => "api",
            LogTag::Metrics => "metrics",
            LogTag::Database => "database",
            LogTag::Prompts => "prompts",
        }
    }

    /// Upper-case label used in console and file output
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Webserver => "WEBSERVER",
            LogTag::Api => "API",
            LogTag::Metrics => "METRICS",
            LogTag::Database => "DATABASE",
            LogTag::Prompts => "PROMPTS",
        }
    }

    pub fn from_debug_key(key: &str) -> Option<Self> {
        LogTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.to_debug_key().eq_ignore_ascii_case(key))
    }
}
