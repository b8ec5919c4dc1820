use clap::Parser;
use salesboard::config::{self, CONFIG_FILE_PATH};
use salesboard::database::{DataAccess, SqliteStore};
use salesboard::metrics::{queries, MetricLimits, MetricsAggregator, MetricsCache, SystemClock};
use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "debug_metrics")]
#[command(about = "Run the dashboard metric queries against a sales database", long_about = None)]
struct Args {
    /// Configuration file supplying the defaults below
    #[arg(short, long, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Sales database file [default: database.path]
    #[arg(short, long)]
    database: Option<String>,

    /// Rows for top products and recent orders [default: metrics.*_limit]
    #[arg(short, long)]
    limit: Option<usize>,

    /// Call the cache this many times to show TTL reuse
    #[arg(short, long, default_value = "3")]
    repeat: usize,

    /// Print the full snapshot as JSON
    #[arg(short, long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    println!("Dashboard Metrics Debug Tool\n");
    println!("{}", "=".repeat(80));

    config::set_config(config::load_config_from_path(&args.config)?)?;
    let database = args
        .database
        .clone()
        .unwrap_or_else(|| config::with_config(|cfg| cfg.database.path.clone()));
    let metrics = config::get_config_clone().metrics;
    let limits = match args.limit {
        Some(limit) => MetricLimits {
            top_products: limit,
            recent_orders: limit,
        },
        None => MetricLimits::from(&metrics),
    };
    println!("Sales database: {}", database);

    let store = SqliteStore::open(&database, 5, Duration::from_secs(5))?;
    let port: Arc<dyn DataAccess> = Arc::new(store);

    println!("\n[INDIVIDUAL QUERIES]\n");

    let started = Instant::now();
    match queries::sales_summary(port.as_ref()).await {
        Ok(sales) => println!(
            "sales_summary         {:>6}ms  orders={} revenue={:.2} avg={:.2}",
            started.elapsed().as_millis(),
            sales.total_orders,
            sales.total_revenue,
            sales.avg_order_value
        ),
        Err(e) => println!("sales_summary         FAILED: {}", e),
    }

    let started = Instant::now();
    match queries::top_products(port.as_ref(), limits.top_products).await {
        Ok(products) => {
            println!("top_products          {:>6}ms  {} rows", started.elapsed().as_millis(), products.len());
            for (i, product) in products.iter().enumerate() {
                println!(
                    "    {}. {} qty={} revenue={:.2}",
                    i + 1,
                    product.product_name,
                    product.total_quantity,
                    product.total_revenue
                );
            }
        }
        Err(e) => println!("top_products          FAILED: {}", e),
    }

    let started = Instant::now();
    match queries::recent_orders(port.as_ref(), limits.recent_orders).await {
        Ok(orders) => {
            println!("recent_orders         {:>6}ms  {} rows", started.elapsed().as_millis(), orders.len());
            for order in &orders {
                println!(
                    "    #{} {} {:.2} {} ({})",
                    order.order_id,
                    order.order_date.format("%Y-%m-%d"),
                    order.total_due,
                    order.customer_name,
                    order.city.as_deref().unwrap_or("no address")
                );
            }
        }
        Err(e) => println!("recent_orders         FAILED: {}", e),
    }

    let started = Instant::now();
    match queries::customer_summary(port.as_ref()).await {
        Ok(customers) => println!(
            "customer_summary      {:>6}ms  total={} with_orders={} business={} individual={}",
            started.elapsed().as_millis(),
            customers.total_customers,
            customers.customers_with_orders,
            customers.business_customers,
            customers.individual_customers
        ),
        Err(e) => println!("customer_summary      FAILED: {}", e),
    }

    let started = Instant::now();
    match queries::geographic_breakdown(port.as_ref()).await {
        Ok(entries) => {
            println!("geographic_breakdown  {:>6}ms  {} rows", started.elapsed().as_millis(), entries.len());
            for entry in &entries {
                println!(
                    "    {} / {} orders={} revenue={:.2}",
                    entry.country, entry.state_province, entry.order_count, entry.total_revenue
                );
            }
        }
        Err(e) => println!("geographic_breakdown  FAILED: {}", e),
    }

    println!("\n{}", "=".repeat(80));
    println!("\n[CACHED AGGREGATION]\n");

    let aggregator = MetricsAggregator::new(port, Arc::new(SystemClock), limits);
    let cache = MetricsCache::new(
        aggregator,
        Duration::from_secs(metrics.ttl_secs),
        metrics.coalesce_refreshes,
    );

    for attempt in 1..=args.repeat.max(1) {
        let started = Instant::now();
        match cache.get_or_refresh().await {
            Ok(snapshot) => {
                println!(
                    "call {}: {:>6}ms  lastUpdated={}",
                    attempt,
                    started.elapsed().as_millis(),
                    snapshot.last_updated.to_rfc3339()
                );
                if args.json && attempt == 1 {
                    println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
                }
            }
            Err(e) => println!("call {}: FAILED: {}", attempt, e),
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("\nDone!");

    Ok(())
}
