/// Aggregation of one dashboard snapshot
///
/// The five queries share no data, so they are issued together and joined
/// with `tokio::try_join!`: the first failure completes the join immediately
/// and the remaining futures are dropped. Queries already handed to the
/// SQLite pool still finish on their blocking worker and return their
/// connection.
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use super::clock::Clock;
use super::queries;
use super::types::MetricSnapshot;
use super::MetricQuery;
use crate::config::MetricsConfig;
use crate::database::DataAccess;
use crate::errors::{AggregationError, DataAccessError};
use crate::logger::{self, LogTag};

/// Bounds for the two list-valued metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricLimits {
    pub top_products: usize,
    pub recent_orders: usize,
}

impl Default for MetricLimits {
    fn default() -> Self {
        Self::from(&MetricsConfig::default())
    }
}

impl From<&MetricsConfig> for MetricLimits {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            top_products: config.top_products_limit,
            recent_orders: config.recent_orders_limit,
        }
    }
}

async fn labelled<T, F>(query: MetricQuery, future: F) -> Result<T, AggregationError>
where
    F: Future<Output = Result<T, DataAccessError>>,
{
    future.await.map_err(|source| AggregationError::new(query, source))
}

pub struct MetricsAggregator {
    port: Arc<dyn DataAccess>,
    clock: Arc<dyn Clock>,
    limits: MetricLimits,
}

impl MetricsAggregator {
    pub fn new(port: Arc<dyn DataAccess>, clock: Arc<dyn Clock>, limits: MetricLimits) -> Self {
        Self { port, clock, limits }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Run all five queries concurrently and merge them into one snapshot.
    ///
    /// All-or-nothing: the first failing query fails the whole computation.
    pub async fn compute(&self) -> Result<MetricSnapshot, AggregationError> {
        let started = Instant::now();
        let port = self.port.as_ref();

        let (sales_metrics, top_products, recent_orders, customers_metrics, geographic_data) = tokio::try_join!(
            labelled(MetricQuery::SalesSummary, queries::sales_summary(port)),
            labelled(
                MetricQuery::TopProducts,
                queries::top_products(port, self.limits.top_products)
            ),
            labelled(
                MetricQuery::RecentOrders,
                queries::recent_orders(port, self.limits.recent_orders)
            ),
            labelled(MetricQuery::CustomerSummary, queries::customer_summary(port)),
            labelled(
                MetricQuery::GeographicBreakdown,
                queries::geographic_breakdown(port)
            ),
        )?;

        let snapshot = MetricSnapshot {
            sales_metrics,
            top_products,
            recent_orders,
            customers_metrics,
            geographic_data,
            last_updated: self.clock.now(),
        };

        logger::debug(
            LogTag::Metrics,
            &format!(
                "Computed dashboard snapshot in {}ms ({} orders, {} products, {} regions)",
                started.elapsed().as_millis(),
                snapshot.sales_metrics.total_orders,
                snapshot.top_products.len(),
                snapshot.geographic_data.len()
            ),
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::seeded_sales_store;
    use crate::metrics::clock::ManualClock;
    use crate::metrics::test_support::ScriptedPort;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn aggregator(port: Arc<ScriptedPort>, clock: Arc<ManualClock>) -> MetricsAggregator {
        MetricsAggregator::new(port, clock, MetricLimits::default())
    }

    #[tokio::test]
    async fn test_compute_merges_fixture_rows() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let port = Arc::new(ScriptedPort::with_fixture());
        let agg = aggregator(Arc::clone(&port), Arc::new(ManualClock::new(now)));

        let snapshot = agg.compute().await.unwrap();
        assert_eq!(snapshot.sales_metrics.total_orders, 3);
        assert_eq!(snapshot.sales_metrics.total_revenue, 1500.0);
        assert_eq!(snapshot.top_products[0].total_revenue, 900.0);
        assert_eq!(snapshot.top_products[1].total_revenue, 600.0);
        let recent: Vec<_> = snapshot.recent_orders.iter().map(|o| o.order_id).collect();
        assert_eq!(recent, vec![3, 2, 1]);
        assert_eq!(snapshot.recent_orders[1].city, None);
        assert_eq!(snapshot.geographic_data[0].country, "Canada");
        assert_eq!(snapshot.customers_metrics.customers_with_orders, 3);
        assert_eq!(snapshot.last_updated, now);
        assert_eq!(port.calls(), 5);
    }

    #[tokio::test]
    async fn test_any_failing_query_fails_the_whole_snapshot() {
        for failing in MetricQuery::ALL {
            let port = Arc::new(ScriptedPort::with_fixture());
            port.fail(failing);
            let agg = aggregator(Arc::clone(&port), Arc::new(ManualClock::new(Utc::now())));

            let err = agg.compute().await.unwrap_err();
            assert_eq!(err.query, failing);
            assert!(matches!(err.source, DataAccessError::Connection(_)));
        }
    }

    #[tokio::test]
    async fn test_first_failure_does_not_wait_for_slow_queries() {
        let port = Arc::new(
            ScriptedPort::with_fixture().stall(MetricQuery::GeographicBreakdown),
        );
        port.fail(MetricQuery::SalesSummary);
        let agg = aggregator(Arc::clone(&port), Arc::new(ManualClock::new(Utc::now())));

        let result = tokio::time::timeout(Duration::from_secs(5), agg.compute())
            .await
            .expect("compute must fail fast instead of waiting on the stalled query");
        assert_eq!(result.unwrap_err().query, MetricQuery::SalesSummary);
    }

    #[tokio::test]
    async fn test_compute_against_sqlite_seed() {
        let (_dir, store) = seeded_sales_store().await;
        let agg = MetricsAggregator::new(
            Arc::new(store),
            Arc::new(ManualClock::new(Utc::now())),
            MetricLimits {
                top_products: 2,
                recent_orders: 3,
            },
        );

        let snapshot = agg.compute().await.unwrap();
        assert_eq!(snapshot.sales_metrics.total_orders, 5);
        assert_eq!(snapshot.top_products.len(), 2);
        assert_eq!(snapshot.recent_orders.len(), 3);
        assert_eq!(snapshot.geographic_data.len(), 3);

        let json = serde_json::to_value(&snapshot).unwrap();
        for key in [
            "salesMetrics",
            "topProducts",
            "recentOrders",
            "customersMetrics",
            "geographicData",
            "lastUpdated",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
