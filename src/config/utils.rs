/// Configuration utilities - loading, environment overrides and access helpers
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::Path;

use super::schemas::{
    Config, DatabaseConfig, ExternalApiConfig, HistoryConfig, MetricsConfig, OrdersConfig,
    ServerConfig,
};
use crate::errors::ConfigError;
use crate::logger::{self, LogTag};

/// Global configuration instance
///
/// Installed once at startup. Components still receive the values they need
/// explicitly; the debug tools read their flag defaults from here.
static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration: defaults, then the TOML file (if present), then the
/// environment, then validation.
pub fn load_config_from_path(path: &str) -> Result<Config, ConfigError> {
    let mut config = read_config_file(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Read a TOML config file; a missing file yields defaults
pub fn read_config_file(path: &str) -> Result<Config, ConfigError> {
    if !Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    let config = toml::from_str::<Config>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;

    if let Ok(table) = contents.parse::<toml::Table>() {
        for key in unknown_keys(&table) {
            logger::warning(
                LogTag::Config,
                &format!("Ignoring unknown key '{}' in {}", key, path),
            );
        }
    }
    Ok(config)
}

/// Dotted keys in a parsed config file that no section declares
pub fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let mut unknown = Vec::new();
    for (section, value) in table {
        let known = match section.as_str() {
            "server" => ServerConfig::KEYS,
            "database" => DatabaseConfig::KEYS,
            "history" => HistoryConfig::KEYS,
            "external_api" => ExternalApiConfig::KEYS,
            "metrics" => MetricsConfig::KEYS,
            "orders" => OrdersConfig::KEYS,
            _ => {
                unknown.push(section.clone());
                continue;
            }
        };
        if let Some(fields) = value.as_table() {
            unknown.extend(
                fields
                    .keys()
                    .filter(|key| !known.contains(&key.as_str()))
                    .map(|key| format!("{}.{}", section, key)),
            );
        }
    }
    unknown
}

/// Apply environment overrides
///
/// `lookup` is injected so tests do not have to mutate the process environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = parse_env("PORT", &port)?;
    }
    if let Some(path) = lookup("SALES_DB_PATH") {
        config.database.path = path;
    }
    if let Some(path) = lookup("HISTORY_DB_PATH") {
        config.history.path = path;
    }
    if let Some(url) = lookup("EXTERNAL_API_URL") {
        config.external_api.url = url;
    }
    if let Some(ttl) = lookup("METRICS_TTL_SECS") {
        config.metrics.ttl_secs = parse_env("METRICS_TTL_SECS", &ttl)?;
    }
    Ok(())
}

fn parse_env<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::invalid(key, format!("'{}': {}", raw, e)))
}

/// Reject values the service cannot run with
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::invalid("server.port", "must be between 1 and 65535"));
    }
    if config.database.max_connections == 0 {
        return Err(ConfigError::invalid("database.max_connections", "must be at least 1"));
    }
    if config.metrics.ttl_secs == 0 {
        return Err(ConfigError::invalid("metrics.ttl_secs", "must be at least 1 second"));
    }
    if config.orders.default_limit == 0 || config.orders.default_limit > config.orders.max_limit {
        return Err(ConfigError::invalid(
            "orders.default_limit",
            format!("must be between 1 and orders.max_limit ({})", config.orders.max_limit),
        ));
    }
    Ok(())
}

/// Install the process-wide configuration
pub fn set_config(config: Config) -> Result<(), ConfigError> {
    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// Execute a function with read access to the configuration
///
/// Falls back to defaults when `set_config` has not been called.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(lock) => f(&lock.read()),
        None => f(&Config::default()),
    }
}

/// Get a clone of the entire configuration
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = read_config_file("definitely/not/here.toml").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.metrics.ttl_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[metrics]\nttl_secs = 5\n\n[server]\nport = 8081\n").unwrap();

        let config = read_config_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.metrics.ttl_secs, 5);
        assert_eq!(config.metrics.top_products_limit, 10);
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_unknown_keys_are_listed() {
        let table: toml::Table = "[metrics]\nttl_secs = 5\nttl_sec = 9\n\n[servr]\nport = 1\n"
            .parse()
            .unwrap();
        let mut unknown = unknown_keys(&table);
        unknown.sort();
        assert_eq!(unknown, vec!["metrics.ttl_sec".to_string(), "servr".to_string()]);
        assert_eq!(Config::KEYS.len(), 6);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = read_config_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("PORT", "7000"),
                ("EXTERNAL_API_URL", "http://localhost:9000/generate"),
                ("METRICS_TTL_SECS", "60"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.external_api.url, "http://localhost:9000/generate");
        assert_eq!(config.metrics.ttl_secs, 60);
        assert_eq!(config.database.path, "data/adventureworks.db");
    }

    #[test]
    fn test_unparseable_env_value_is_rejected() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn test_installed_config_is_read_back() {
        // The only test touching the global; defaults until installed
        assert_eq!(get_config_clone(), Config::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"elsewhere/sales.db\"\n").unwrap();
        set_config(read_config_file(path.to_str().unwrap()).unwrap()).unwrap();

        assert_eq!(with_config(|cfg| cfg.database.path.clone()), "elsewhere/sales.db");
        assert_eq!(get_config_clone().metrics.ttl_secs, 30);
        assert!(matches!(
            set_config(Config::default()),
            Err(ConfigError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let mut config = Config::default();
        config.metrics.ttl_secs = 0;
        assert!(validate_config(&config).is_err());

        config.metrics.ttl_secs = 1;
        assert!(validate_config(&config).is_ok());
    }
}
