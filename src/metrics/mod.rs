//! Dashboard metrics
//!
//! Five independent aggregate queries are fanned out against the data access
//! port, merged into one immutable [`MetricSnapshot`] and served through a
//! time-bounded [`MetricsCache`].
//!
//! - `queries`: the five SQL aggregates and their row shaping
//! - `aggregator`: concurrent, fail-fast composition of a snapshot
//! - `cache`: freshness window over the latest snapshot
//! - `clock`: injectable time source

mod aggregator;
mod cache;
mod clock;
pub mod queries;
mod types;

pub use aggregator::{MetricLimits, MetricsAggregator};
pub use cache::MetricsCache;
pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub(crate) use clock::ManualClock;
pub use types::{
    CustomersMetrics, GeographicEntry, MetricSnapshot, RecentOrder, SalesMetrics, TopProduct,
};

use std::fmt;

/// Identifies one of the five dashboard queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricQuery {
    SalesSummary,
    TopProducts,
    RecentOrders,
    CustomerSummary,
    GeographicBreakdown,
}

impl MetricQuery {
    pub const ALL: [MetricQuery; 5] = [
        MetricQuery::SalesSummary,
        MetricQuery::TopProducts,
        MetricQuery::RecentOrders,
        MetricQuery::CustomerSummary,
        MetricQuery::GeographicBreakdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricQuery::SalesSummary => "sales_summary",
            MetricQuery::TopProducts => "top_products",
            MetricQuery::RecentOrders => "recent_orders",
            MetricQuery::CustomerSummary => "customer_summary",
            MetricQuery::GeographicBreakdown => "geographic_breakdown",
        }
    }
}

impl fmt::Display for MetricQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted data access port for the aggregator and cache tests
    use super::queries;
    use super::MetricQuery;
    use crate::database::{DataAccess, QueryParams, Row};
    use crate::errors::DataAccessError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    pub struct ScriptedPort {
        rows: HashMap<MetricQuery, Vec<Row>>,
        failing: Mutex<HashSet<MetricQuery>>,
        stalled: HashSet<MetricQuery>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl ScriptedPort {
        /// Port answering every query with the fixture rows below
        pub fn with_fixture() -> Self {
            let mut rows = HashMap::new();
            rows.insert(
                MetricQuery::SalesSummary,
                vec![Row::new()
                    .with("totalOrders", 3i64)
                    .with("totalRevenue", 1500.0)
                    .with("avgOrderValue", 500.0)
                    .with("firstOrderDate", "2008-06-01T00:00:00Z")
                    .with("lastOrderDate", "2008-06-03T00:00:00Z")],
            );
            // Deliberately out of order; shaping must sort
            rows.insert(
                MetricQuery::TopProducts,
                vec![
                    Row::new()
                        .with("productName", "Road-250 Red, 44")
                        .with("totalQuantity", 2i64)
                        .with("totalRevenue", 600.0),
                    Row::new()
                        .with("productName", "Mountain-200 Black, 38")
                        .with("totalQuantity", 3i64)
                        .with("totalRevenue", 900.0),
                ],
            );
            rows.insert(
                MetricQuery::RecentOrders,
                vec![
                    Row::new()
                        .with("orderId", 1i64)
                        .with("orderDate", "2008-06-01T00:00:00Z")
                        .with("totalDue", 500.0)
                        .with("customerName", "Orlando Gee")
                        .with("city", "Toronto"),
                    Row::new()
                        .with("orderId", 3i64)
                        .with("orderDate", "2008-06-03T00:00:00Z")
                        .with("totalDue", 400.0)
                        .with("customerName", "Keith Harris")
                        .with("city", "Seattle"),
                    Row::new()
                        .with("orderId", 2i64)
                        .with("orderDate", "2008-06-02T00:00:00Z")
                        .with("totalDue", 600.0)
                        .with("customerName", "Donna Carreras")
                        .with("city", crate::database::SqlValue::Null),
                ],
            );
            rows.insert(
                MetricQuery::CustomerSummary,
                vec![Row::new()
                    .with("totalCustomers", 4i64)
                    .with("customersWithOrders", 3i64)
                    .with("businessCustomers", 2i64)
                    .with("individualCustomers", 2i64)],
            );
            rows.insert(
                MetricQuery::GeographicBreakdown,
                vec![
                    Row::new()
                        .with("country", "United States")
                        .with("stateProvince", "Washington")
                        .with("orderCount", 1i64)
                        .with("totalRevenue", 400.0),
                    Row::new()
                        .with("country", "Canada")
                        .with("stateProvince", "Ontario")
                        .with("orderCount", 2i64)
                        .with("totalRevenue", 1100.0),
                ],
            );
            Self {
                rows,
                ..Self::default()
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// The query never completes
        pub fn stall(mut self, query: MetricQuery) -> Self {
            self.stalled.insert(query);
            self
        }

        pub fn fail(&self, query: MetricQuery) {
            self.failing.lock().insert(query);
        }

        pub fn recover(&self) {
            self.failing.lock().clear();
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn identify(sql: &str) -> Option<MetricQuery> {
        MetricQuery::ALL
            .iter()
            .copied()
            .find(|query| queries::sql_for(*query) == sql)
    }

    #[async_trait]
    impl DataAccess for ScriptedPort {
        async fn execute(&self, sql: &str, _params: QueryParams) -> Result<Vec<Row>, DataAccessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let query = identify(sql)
                .ok_or_else(|| DataAccessError::Connection(format!("unscripted query: {}", sql)))?;

            if self.stalled.contains(&query) {
                std::future::pending::<()>().await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.lock().contains(&query) {
                return Err(DataAccessError::Connection("store unreachable".to_string()));
            }
            Ok(self.rows.get(&query).cloned().unwrap_or_default())
        }

        async fn execute_write(&self, _sql: &str, _params: QueryParams) -> Result<usize, DataAccessError> {
            Ok(0)
        }

        async fn execute_batch(
            &self,
            statements: Vec<(String, QueryParams)>,
        ) -> Result<Vec<usize>, DataAccessError> {
            Ok(vec![0; statements.len()])
        }
    }
}
