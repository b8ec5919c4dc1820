//! Relational storage behind the data access port
//!
//! - `port`: the `DataAccess` trait the rest of the service depends on
//! - `values`: parameters, rows and cell values crossing the port
//! - `sqlite`: pooled rusqlite adapter
//! - `schema` / `seed`: table definitions and the demo data set
//! - `orders` / `history`: repositories used by the HTTP layer

pub mod history;
pub mod orders;
pub mod port;
pub mod schema;
pub mod seed;
pub mod sqlite;
pub mod values;

pub use history::{PromptHistoryEntry, PromptHistoryStore};
pub use orders::{NewOrder, OrderDetails, OrderFilter, OrderRepository, OrderUpdate};
pub use port::DataAccess;
pub use sqlite::SqliteStore;
pub use values::{format_timestamp, parse_timestamp, QueryParams, Row, SqlValue};

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::time::Duration;

    /// Temporary sales database with the schema and demo data loaded
    pub async fn seeded_sales_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(dir.path().join("sales.db"), 4, Duration::from_secs(5))
            .expect("open sales store");
        schema::ensure_sales_schema(&store).await.expect("schema");
        seed::seed_demo_data(&store).await.expect("seed");
        (dir, store)
    }

    /// Temporary, empty prompt history database
    pub async fn history_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(dir.path().join("history.db"), 2, Duration::from_secs(5))
            .expect("open history store");
        schema::ensure_history_schema(&store).await.expect("schema");
        (dir, store)
    }
}
