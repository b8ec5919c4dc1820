/// Command-line arguments for the salesboard binary
///
/// Parsed once in `main`. CLI values are the last configuration layer:
/// defaults, then the TOML file, then the environment, then these flags.
use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE_PATH};
use crate::logger::{LogLevel, LogTag, LoggerConfig};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "salesboard", version, about = "Sales dashboard API server")]
pub struct Args {
    /// Configuration file (missing file = defaults)
    #[arg(long, default_value = CONFIG_FILE_PATH)]
    pub config: String,

    /// Bind address, overrides server.host / HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port, overrides server.port / PORT
    #[arg(long)]
    pub port: Option<u16>,

    /// Load the demo sales data set before serving
    #[arg(long)]
    pub seed_demo: bool,

    /// Append a plain copy of every log line to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Show every message, including verbose ones from all tags
    #[arg(long)]
    pub verbose: bool,

    /// Least important level to print (`warning` quiets routine info lines)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    #[arg(long = "debug-system")]
    pub debug_system: bool,
    #[arg(long = "debug-config")]
    pub debug_config: bool,
    #[arg(long = "debug-webserver")]
    pub debug_webserver: bool,
    #[arg(long = "debug-api")]
    pub debug_api: bool,
    #[arg(long = "debug-metrics")]
    pub debug_metrics: bool,
    #[arg(long = "debug-database")]
    pub debug_database: bool,
    #[arg(long = "debug-prompts")]
    pub debug_prompts: bool,
}

impl Args {
    /// Tags whose `--debug-<tag>` flag was given
    pub fn debug_tags(&self) -> Vec<LogTag> {
        [
            (self.debug_system, LogTag::System),
            (self.debug_config, LogTag::Config),
            (self.debug_webserver, LogTag::Webserver),
            (self.debug_api, LogTag::Api),
            (self.debug_metrics, LogTag::Metrics),
            (self.debug_database, LogTag::Database),
            (self.debug_prompts, LogTag::Prompts),
        ]
        .into_iter()
        .filter_map(|(enabled, tag)| enabled.then_some(tag))
        .collect()
    }

    pub fn logger_config(&self) -> LoggerConfig {
        let tags = self.debug_tags();
        let mut config = LoggerConfig::from_flags(tags.iter().map(|tag| tag.to_debug_key()), self.verbose);
        if let Some(level) = self.log_level {
            config.min_level = level;
        }
        config.log_file = self.log_file.clone();
        config
    }

    /// Apply `--host` / `--port` on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["salesboard"]);
        assert_eq!(args.config, CONFIG_FILE_PATH);
        assert!(!args.seed_demo);
        assert!(args.debug_tags().is_empty());
        assert_eq!(args.logger_config().min_level, LogLevel::Info);
    }

    #[test]
    fn test_debug_flags_and_overrides() {
        let args = Args::parse_from([
            "salesboard",
            "--port",
            "8081",
            "--host",
            "0.0.0.0",
            "--debug-metrics",
            "--debug-database",
            "--seed-demo",
        ]);
        assert_eq!(args.debug_tags(), vec![LogTag::Metrics, LogTag::Database]);
        let logger = args.logger_config();
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert!(logger.debug_tags.contains(&LogTag::Metrics));

        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(args.seed_demo);
    }

    #[test]
    fn test_log_level_flag_accepts_aliases() {
        let args = Args::parse_from(["salesboard", "--log-level", "warn"]);
        assert_eq!(args.logger_config().min_level, LogLevel::Warning);

        let args = Args::parse_from(["salesboard", "--verbose", "--log-level", "info"]);
        assert_eq!(args.logger_config().min_level, LogLevel::Info);

        assert!(Args::try_parse_from(["salesboard", "--log-level", "loud"]).is_err());
    }
}
