/// Freshness cache over the latest dashboard snapshot
///
/// Holds at most one entry. An entry is served while
/// `now - computed_at < ttl`; after that the next caller recomputes and the
/// entry is replaced wholesale. A failed refresh is returned to the caller
/// even when an expired entry exists.
///
/// With coalescing on, callers that queued behind a refresh take its outcome,
/// success or failure. A caller arriving after a failure completed starts a
/// new refresh.
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::aggregator::{MetricLimits, MetricsAggregator};
use super::clock::Clock;
use super::types::MetricSnapshot;
use crate::config::MetricsConfig;
use crate::database::DataAccess;
use crate::errors::{AggregationError, CacheRefreshError};
use crate::logger::{self, LogTag};

struct CacheEntry {
    snapshot: Arc<MetricSnapshot>,
    computed_at: DateTime<Utc>,
}

pub struct MetricsCache {
    aggregator: MetricsAggregator,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entry: RwLock<Option<Arc<CacheEntry>>>,
    /// Present when concurrent misses share one refresh; holds the failure
    /// of the last completed refresh, `None` after a success
    refresh_guard: Option<tokio::sync::Mutex<Option<Arc<AggregationError>>>>,
    /// Completed refresh attempts, successful or not
    refreshes: AtomicU64,
}

impl MetricsCache {
    pub fn new(aggregator: MetricsAggregator, ttl: Duration, coalesce_refreshes: bool) -> Self {
        Self {
            clock: aggregator.clock(),
            aggregator,
            ttl,
            entry: RwLock::new(None),
            refresh_guard: coalesce_refreshes.then(|| tokio::sync::Mutex::new(None)),
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn from_config(port: Arc<dyn DataAccess>, clock: Arc<dyn Clock>, config: &MetricsConfig) -> Self {
        let aggregator = MetricsAggregator::new(port, clock, MetricLimits::from(config));
        Self::new(
            aggregator,
            Duration::from_secs(config.ttl_secs),
            config.coalesce_refreshes,
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// When the stored snapshot was computed, if any
    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.entry.read().as_ref().map(|entry| entry.computed_at)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        match (now - entry.computed_at).to_std() {
            Ok(elapsed) => elapsed < self.ttl,
            // Clock stepped backwards
            Err(_) => true,
        }
    }

    fn fresh_snapshot(&self) -> Option<Arc<MetricSnapshot>> {
        let now = self.clock.now();
        let guard = self.entry.read();
        guard
            .as_ref()
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Serve the stored snapshot while fresh, otherwise recompute
    pub async fn get_or_refresh(&self) -> Result<Arc<MetricSnapshot>, CacheRefreshError> {
        if let Some(snapshot) = self.fresh_snapshot() {
            logger::debug(LogTag::Metrics, "Dashboard metrics served from cache");
            return Ok(snapshot);
        }

        let mut refreshing = match &self.refresh_guard {
            Some(guard) => {
                let seen = self.refreshes.load(Ordering::Acquire);
                let last_failure = guard.lock().await;
                // Another caller may have refreshed while we waited
                if let Some(snapshot) = self.fresh_snapshot() {
                    logger::debug(
                        LogTag::Metrics,
                        "Dashboard metrics served from a refresh completed while waiting",
                    );
                    return Ok(snapshot);
                }
                if self.refreshes.load(Ordering::Acquire) != seen {
                    if let Some(source) = last_failure.as_ref() {
                        logger::debug(
                            LogTag::Metrics,
                            &format!("Sharing refresh failure with waiting caller: {}", source),
                        );
                        return Err(CacheRefreshError {
                            source: Arc::clone(source),
                            had_expired_entry: self.entry.read().is_some(),
                        });
                    }
                }
                Some(last_failure)
            }
            None => None,
        };

        let had_expired_entry = self.entry.read().is_some();
        let outcome = self.aggregator.compute().await;
        self.refreshes.fetch_add(1, Ordering::AcqRel);
        let snapshot = match outcome {
            Ok(snapshot) => {
                if let Some(last_failure) = refreshing.as_mut() {
                    **last_failure = None;
                }
                Arc::new(snapshot)
            }
            Err(source) => {
                logger::error(
                    LogTag::Metrics,
                    &format!(
                        "Dashboard metrics refresh failed ({}): {}",
                        if had_expired_entry {
                            "expired entry not served"
                        } else {
                            "no cached entry"
                        },
                        source
                    ),
                );
                let source = Arc::new(source);
                if let Some(last_failure) = refreshing.as_mut() {
                    **last_failure = Some(Arc::clone(&source));
                }
                return Err(CacheRefreshError {
                    source,
                    had_expired_entry,
                });
            }
        };

        let computed_at = self.clock.now();
        *self.entry.write() = Some(Arc::new(CacheEntry {
            snapshot: Arc::clone(&snapshot),
            computed_at,
        }));

        logger::info(
            LogTag::Metrics,
            &format!(
                "Dashboard metrics refreshed at {} (valid for {}s)",
                computed_at.to_rfc3339(),
                self.ttl.as_secs()
            ),
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::clock::ManualClock;
    use crate::metrics::test_support::ScriptedPort;
    use crate::metrics::MetricQuery;
    use chrono::TimeZone;

    const TTL: Duration = Duration::from_secs(30);

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn cache_with(port: Arc<ScriptedPort>, clock: Arc<ManualClock>, coalesce: bool) -> MetricsCache {
        let aggregator = MetricsAggregator::new(port, clock, MetricLimits::default());
        MetricsCache::new(aggregator, TTL, coalesce)
    }

    #[tokio::test]
    async fn test_within_ttl_reuses_snapshot_without_port_calls() {
        let port = Arc::new(ScriptedPort::with_fixture());
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache_with(Arc::clone(&port), Arc::clone(&clock), true);

        let first = cache.get_or_refresh().await.unwrap();
        assert_eq!(port.calls(), 5);

        for step in [Duration::from_millis(500), Duration::from_secs(10), Duration::from_millis(19_499)] {
            clock.advance(step);
            let again = cache.get_or_refresh().await.unwrap();
            assert!(Arc::ptr_eq(&first, &again));
        }
        assert_eq!(port.calls(), 5);
        assert_eq!(cache.computed_at(), Some(start()));
    }

    #[tokio::test]
    async fn test_expiry_triggers_exactly_one_recompute() {
        let port = Arc::new(ScriptedPort::with_fixture());
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache_with(Arc::clone(&port), Arc::clone(&clock), true);

        let first = cache.get_or_refresh().await.unwrap();
        clock.advance(TTL);
        let second = cache.get_or_refresh().await.unwrap();
        let third = cache.get_or_refresh().await.unwrap();

        assert_eq!(port.calls(), 10);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
        assert_eq!(second.last_updated, start() + chrono::Duration::seconds(30));
    }

    #[tokio::test]
    async fn test_consecutive_calls_within_a_second_hit_port_once() {
        let port = Arc::new(ScriptedPort::with_fixture());
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache_with(Arc::clone(&port), Arc::clone(&clock), false);

        cache.get_or_refresh().await.unwrap();
        clock.advance(Duration::from_millis(900));
        cache.get_or_refresh().await.unwrap();

        // one aggregation = five queries
        assert_eq!(port.calls(), MetricQuery::ALL.len());
    }

    // Failed refreshes are surfaced, never masked by the expired snapshot
    #[tokio::test]
    async fn test_failed_refresh_never_serves_expired_entry() {
        let port = Arc::new(ScriptedPort::with_fixture());
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache_with(Arc::clone(&port), Arc::clone(&clock), true);

        cache.get_or_refresh().await.unwrap();
        clock.advance(Duration::from_secs(31));
        port.fail(MetricQuery::TopProducts);

        let err = cache.get_or_refresh().await.unwrap_err();
        assert!(err.had_expired_entry);
        assert_eq!(err.source.query, MetricQuery::TopProducts);
        // still expired, still failing
        assert!(cache.get_or_refresh().await.is_err());

        port.recover();
        let snapshot = cache.get_or_refresh().await.unwrap();
        assert_eq!(snapshot.last_updated, start() + chrono::Duration::seconds(31));
    }

    #[tokio::test]
    async fn test_failure_without_prior_entry() {
        let port = Arc::new(ScriptedPort::with_fixture());
        port.fail(MetricQuery::CustomerSummary);
        let cache = cache_with(Arc::clone(&port), Arc::new(ManualClock::new(start())), true);

        let err = cache.get_or_refresh().await.unwrap_err();
        assert!(!err.had_expired_entry);
        assert_eq!(cache.computed_at(), None);
    }

    #[tokio::test]
    async fn test_concurrent_misses_coalesce_into_one_refresh() {
        let port = Arc::new(ScriptedPort::with_fixture().with_delay(Duration::from_millis(20)));
        let cache = cache_with(Arc::clone(&port), Arc::new(ManualClock::new(start())), true);

        let (a, b, c) = tokio::join!(
            cache.get_or_refresh(),
            cache.get_or_refresh(),
            cache.get_or_refresh()
        );
        let a = a.unwrap();
        assert!(Arc::ptr_eq(&a, &b.unwrap()));
        assert!(Arc::ptr_eq(&a, &c.unwrap()));
        assert_eq!(port.calls(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_a_failed_refresh() {
        let port = Arc::new(ScriptedPort::with_fixture().with_delay(Duration::from_millis(50)));
        port.fail(MetricQuery::SalesSummary);
        let cache = cache_with(Arc::clone(&port), Arc::new(ManualClock::new(start())), true);

        let results = tokio::join!(
            cache.get_or_refresh(),
            cache.get_or_refresh(),
            cache.get_or_refresh(),
            cache.get_or_refresh(),
            cache.get_or_refresh()
        );
        let errors = [results.0, results.1, results.2, results.3, results.4].map(|r| r.unwrap_err());
        for err in &errors {
            assert_eq!(err.source.query, MetricQuery::SalesSummary);
            assert!(!err.had_expired_entry);
            assert!(Arc::ptr_eq(&err.source, &errors[0].source));
        }
        assert_eq!(port.calls(), 5);

        // Callers arriving after the failure start a fresh refresh
        port.recover();
        assert!(cache.get_or_refresh().await.is_ok());
        assert_eq!(port.calls(), 10);
    }

    #[tokio::test]
    async fn test_uncoalesced_misses_each_recompute() {
        let port = Arc::new(ScriptedPort::with_fixture().with_delay(Duration::from_millis(20)));
        let cache = cache_with(Arc::clone(&port), Arc::new(ManualClock::new(start())), false);

        let (a, b) = tokio::join!(cache.get_or_refresh(), cache.get_or_refresh());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(port.calls(), 10);
    }
}
