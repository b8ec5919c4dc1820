use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use salesboard::{
    apis::HttpPromptForwarder,
    arguments::Args,
    config::{self, Config},
    database::{schema, seed, OrderRepository, PromptHistoryStore, SqliteStore},
    logger::{self, LogTag},
    metrics::{MetricsCache, SystemClock},
    prompts::PromptService,
    webserver::{self, state::AppState},
};

/// Entry point for the salesboard API server
///
/// Startup order:
/// - `.env`, CLI flags, logger
/// - configuration (file, environment, flags)
/// - both SQLite stores with their schemas
/// - metrics cache, order repository, prompt service
/// - HTTP server until Ctrl+C
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logger::init(args.logger_config());

    logger::info(
        LogTag::System,
        &format!("Salesboard v{} starting up...", env!("CARGO_PKG_VERSION")),
    );

    if let Err(e) = run(args).await {
        logger::error(LogTag::System, &format!("{:#}", e));
        logger::flush();
        std::process::exit(1);
    }

    logger::info(LogTag::System, "Salesboard stopped");
    logger::flush();
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    let sales = SqliteStore::open(
        &config.database.path,
        config.database.max_connections,
        Duration::from_millis(config.database.busy_timeout_ms),
    )
    .context("Failed to open sales database")?;
    schema::ensure_sales_schema(&sales)
        .await
        .context("Failed to prepare sales schema")?;
    if args.seed_demo {
        seed::seed_demo_data(&sales)
            .await
            .context("Failed to load demo data")?;
    }

    let history = SqliteStore::open(
        &config.history.path,
        config.database.max_connections,
        Duration::from_millis(config.database.busy_timeout_ms),
    )
    .context("Failed to open prompt history database")?;
    schema::ensure_history_schema(&history)
        .await
        .context("Failed to prepare prompt history schema")?;

    let forwarder = HttpPromptForwarder::from_config(&config.external_api)
        .context("Failed to build external API client")?;
    if !forwarder.is_configured() {
        logger::warning(
            LogTag::Api,
            "External API URL is not configured; POST /api/prompts will fail",
        );
    }

    let clock = Arc::new(SystemClock);
    let sales = Arc::new(sales);
    let metrics = Arc::new(MetricsCache::from_config(
        sales.clone(),
        clock.clone(),
        &config.metrics,
    ));
    let orders = OrderRepository::new(sales, config.orders.clone());
    let prompts = Arc::new(PromptService::new(
        PromptHistoryStore::new(Arc::new(history)),
        Arc::new(forwarder),
        clock,
        config.history.list_limit,
    ));

    ctrlc::set_handler(|| {
        logger::info(LogTag::System, "Shutdown requested");
        webserver::shutdown();
    })
    .context("Failed to install Ctrl+C handler")?;

    let state = Arc::new(AppState::new(config, metrics, orders, prompts));
    webserver::start_server(state)
        .await
        .map_err(anyhow::Error::msg)
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = config::load_config_from_path(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;
    args.apply_overrides(&mut config);
    config::validate_config(&config).context("Invalid command-line override")?;
    config::set_config(config.clone())?;

    logger::debug(
        LogTag::Config,
        &format!(
            "Configuration: server={}:{} sales_db={} history_db={} metrics_ttl={}s",
            config.server.host,
            config.server.port,
            config.database.path,
            config.history.path,
            config.metrics.ttl_secs
        ),
    );
    Ok(config)
}
