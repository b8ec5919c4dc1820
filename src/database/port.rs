/// Data access port
///
/// The boundary through which the service issues parameterized queries
/// against a relational store. `SqliteStore` is the production adapter;
/// tests substitute scripted implementations.
use async_trait::async_trait;

use super::values::{QueryParams, Row};
use crate::errors::DataAccessError;

#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Run a statement that yields rows (SELECT, or a write with RETURNING)
    async fn execute(&self, sql: &str, params: QueryParams) -> Result<Vec<Row>, DataAccessError>;

    /// Run a statement for its side effect; returns the number of affected rows
    async fn execute_write(&self, sql: &str, params: QueryParams) -> Result<usize, DataAccessError>;

    /// Run several write statements atomically
    async fn execute_batch(
        &self,
        statements: Vec<(String, QueryParams)>,
    ) -> Result<Vec<usize>, DataAccessError>;
}
