/// Configuration system
///
/// Sections are declared with `config_struct!` (defaults inline), read from
/// `data/config.toml`, then overridden from the environment (`.env` is loaded
/// by the binary) and finally by CLI flags.
pub mod macros;
pub mod schemas;
mod utils;

pub use schemas::{
    Config, DatabaseConfig, ExternalApiConfig, HistoryConfig, MetricsConfig, OrdersConfig,
    ServerConfig,
};
pub use utils::{
    apply_env_overrides, get_config_clone, load_config_from_path, read_config_file, set_config,
    unknown_keys, validate_config, with_config, CONFIG_FILE_PATH,
};
