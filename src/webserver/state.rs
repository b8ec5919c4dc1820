/// Shared application state for the webserver
///
/// Built once in `main` (or by tests) and handed to the router with
/// `with_state`; handlers never reach for globals.
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::database::OrderRepository;
use crate::metrics::MetricsCache;
use crate::prompts::PromptService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Dashboard metrics behind the freshness cache
    pub metrics: Arc<MetricsCache>,

    pub orders: OrderRepository,
    pub prompts: Arc<PromptService>,

    /// Server startup time
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Config,
        metrics: Arc<MetricsCache>,
        orders: OrderRepository,
        prompts: Arc<PromptService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metrics,
            orders,
            prompts,
            startup_time: Utc::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.startup_time).num_seconds().max(0) as u64
    }
}
