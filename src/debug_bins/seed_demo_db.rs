use clap::Parser;
use salesboard::config::{self, CONFIG_FILE_PATH};
use salesboard::database::{schema, seed, DataAccess, QueryParams, SqliteStore};
use std::error::Error;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "seed_demo_db")]
#[command(about = "Create the sales schema and load the demo data set", long_about = None)]
struct Args {
    /// Configuration file supplying the default database path
    #[arg(short, long, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Sales database file, created when missing [default: database.path]
    #[arg(short, long)]
    database: Option<String>,

    /// Also create the prompt history schema in this file
    #[arg(long)]
    history: Option<String>,
}

const TABLES: [&str; 5] = [
    "Customer",
    "Address",
    "Product",
    "SalesOrderHeader",
    "SalesOrderDetail",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    println!("Demo Database Seeder\n");
    println!("{}", "=".repeat(80));

    config::set_config(config::load_config_from_path(&args.config)?)?;
    let database = args
        .database
        .unwrap_or_else(|| config::with_config(|cfg| cfg.database.path.clone()));

    let store = SqliteStore::open(&database, 2, Duration::from_secs(5))?;
    schema::ensure_sales_schema(&store).await?;
    seed::seed_demo_data(&store).await?;

    println!("\n[ROW COUNTS] {}\n", database);
    for table in TABLES {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", table);
        let rows = store.execute(&sql, QueryParams::new()).await?;
        let count = match rows.first() {
            Some(row) => row.i64("n")?,
            None => 0,
        };
        println!("{:<20} {}", table, count);
    }

    if let Some(path) = args.history {
        let history = SqliteStore::open(&path, 1, Duration::from_secs(5))?;
        schema::ensure_history_schema(&history).await?;
        println!("\nPrompt history schema ready in {}", path);
    }

    println!("\n{}", "=".repeat(80));
    println!("\nDone!");

    Ok(())
}
