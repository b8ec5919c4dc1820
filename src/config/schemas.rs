/// Configuration schemas - every section defined once with its defaults
use crate::config_struct;

// ============================================================================
// SERVER
// ============================================================================

config_struct! {
    /// HTTP listener configuration
    pub struct ServerConfig {
        /// IP to bind: 127.0.0.1 = localhost only, 0.0.0.0 = all interfaces
        host: String = "127.0.0.1".to_string(),
        port: u16 = 5000,
        /// Allow any origin (browser dashboards served from elsewhere)
        cors_permissive: bool = true,
    }
}

// ============================================================================
// DATABASES
// ============================================================================

config_struct! {
    /// Sales database (AdventureWorksLT-style schema)
    pub struct DatabaseConfig {
        path: String = "data/adventureworks.db".to_string(),
        max_connections: usize = 20,
        busy_timeout_ms: u64 = 30_000,
    }
}

config_struct! {
    /// Prompt history database
    pub struct HistoryConfig {
        path: String = "data/prompt_history.db".to_string(),
        /// Entries returned by GET /api/prompts/history
        list_limit: usize = 100,
    }
}

// ============================================================================
// EXTERNAL API
// ============================================================================

config_struct! {
    /// Service that receives forwarded prompts
    pub struct ExternalApiConfig {
        /// Empty = not configured; prompt forwarding then fails with a 500
        url: String = String::new(),
        timeout_secs: u64 = 120,
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

config_struct! {
    /// Dashboard metrics aggregation and freshness cache
    pub struct MetricsConfig {
        ttl_secs: u64 = 30,
        top_products_limit: usize = 10,
        recent_orders_limit: usize = 10,
        /// Share one in-flight refresh between concurrent cache misses
        coalesce_refreshes: bool = true,
    }
}

config_struct! {
    /// Order listing bounds
    pub struct OrdersConfig {
        default_limit: usize = 100,
        max_limit: usize = 1000,
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration (data/config.toml)
    pub struct Config {
        server: ServerConfig = ServerConfig::default(),
        database: DatabaseConfig = DatabaseConfig::default(),
        history: HistoryConfig = HistoryConfig::default(),
        external_api: ExternalApiConfig = ExternalApiConfig::default(),
        metrics: MetricsConfig = MetricsConfig::default(),
        orders: OrdersConfig = OrdersConfig::default(),
    }
}
