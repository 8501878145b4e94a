//! Metrics collection for the exchange-rate service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use skyarchive_fx::RateFetcherStats;

/// HTTP-level counters. Fetch-level counters live on the fetcher.
pub struct Metrics {
    /// Exchange-rate requests served.
    pub exchange_rate_requests: AtomicU64,
    /// Suggested-amount requests served.
    pub suggested_amount_requests: AtomicU64,
    /// Requests rejected for malformed parameters.
    pub bad_requests: AtomicU64,
    /// Requests answered with 500.
    pub internal_errors: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            exchange_rate_requests: AtomicU64::new(0),
            suggested_amount_requests: AtomicU64::new(0),
            bad_requests: AtomicU64::new(0),
            internal_errors: AtomicU64::new(0),
        }
    }

    pub fn exchange_rate_request(&self) {
        self.exchange_rate_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn suggested_amount_request(&self) {
        self.suggested_amount_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bad_request(&self) {
        self.bad_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn internal_error(&self) {
        self.internal_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            exchange_rate_requests: self.exchange_rate_requests.load(Ordering::Relaxed),
            suggested_amount_requests: self.suggested_amount_requests.load(Ordering::Relaxed),
            bad_requests: self.bad_requests.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format, together with the fetcher's.
    pub fn to_prometheus(&self, fetcher: &RateFetcherStats) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP skyarchive_exchange_rate_requests_total Exchange-rate requests served
# TYPE skyarchive_exchange_rate_requests_total counter
skyarchive_exchange_rate_requests_total {}

# HELP skyarchive_suggested_amount_requests_total Suggested-amount requests served
# TYPE skyarchive_suggested_amount_requests_total counter
skyarchive_suggested_amount_requests_total {}

# HELP skyarchive_bad_requests_total Requests rejected for malformed parameters
# TYPE skyarchive_bad_requests_total counter
skyarchive_bad_requests_total {}

# HELP skyarchive_internal_errors_total Requests answered with an internal error
# TYPE skyarchive_internal_errors_total counter
skyarchive_internal_errors_total {}

# HELP skyarchive_rate_fetches_total Rate snapshot lookups
# TYPE skyarchive_rate_fetches_total counter
skyarchive_rate_fetches_total {}

# HELP skyarchive_rate_cache_hits_total Lookups served from the cache
# TYPE skyarchive_rate_cache_hits_total counter
skyarchive_rate_cache_hits_total {}

# HELP skyarchive_rate_sweeps_total Upstream provider sweeps
# TYPE skyarchive_rate_sweeps_total counter
skyarchive_rate_sweeps_total {}

# HELP skyarchive_provider_failures_total Individual provider failures
# TYPE skyarchive_provider_failures_total counter
skyarchive_provider_failures_total {}

# HELP skyarchive_rate_fallbacks_total Sweeps that ended on the fallback table
# TYPE skyarchive_rate_fallbacks_total counter
skyarchive_rate_fallbacks_total {}
"#,
            snapshot.exchange_rate_requests,
            snapshot.suggested_amount_requests,
            snapshot.bad_requests,
            snapshot.internal_errors,
            fetcher.requests,
            fetcher.cache_hits,
            fetcher.sweeps,
            fetcher.provider_failures,
            fetcher.fallbacks,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub exchange_rate_requests: u64,
    pub suggested_amount_requests: u64,
    pub bad_requests: u64,
    pub internal_errors: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = Metrics::new();

        metrics.exchange_rate_request();
        metrics.exchange_rate_request();
        metrics.bad_request();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.exchange_rate_requests, 2);
        assert_eq!(snapshot.bad_requests, 1);
        assert_eq!(snapshot.internal_errors, 0);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.suggested_amount_request();

        let stats = RateFetcherStats {
            requests: 4,
            cache_hits: 3,
            sweeps: 1,
            provider_failures: 2,
            fallbacks: 0,
        };
        let output = metrics.to_prometheus(&stats);
        assert!(output.contains("skyarchive_suggested_amount_requests_total 1"));
        assert!(output.contains("skyarchive_rate_cache_hits_total 3"));
        assert!(output.contains("skyarchive_provider_failures_total 2"));
        assert!(output.contains("skyarchive_rate_fallbacks_total 0"));
    }
}
