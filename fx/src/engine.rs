//! Rate fetcher: cached, ordered sweep over providers with a static fallback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use skyarchive_common::{epoch_millis, SharedClock, SystemClock};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::{RateCache, RateCacheConfig};
use crate::error::FxError;
use crate::provider::RateProvider;
use crate::snapshot::RateSnapshot;

/// Configuration for the rate fetcher.
#[derive(Debug, Clone, Default)]
pub struct RateFetcherConfig {
    /// Cache configuration.
    pub cache: RateCacheConfig,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    sweeps: AtomicU64,
    provider_failures: AtomicU64,
    fallbacks: AtomicU64,
}

/// Fetches the allow-listed rate table, never failing.
///
/// Providers are tried strictly in the order given; the first one with at
/// least one usable rate wins. When all fail the static fallback table is
/// served and cached like any other snapshot.
pub struct RateFetcher {
    providers: Vec<Arc<dyn RateProvider>>,
    cache: RateCache,
    clock: SharedClock,
    /// Serializes refreshes so concurrent misses cause a single sweep.
    refresh: Mutex<()>,
    counters: Counters,
}

impl RateFetcher {
    /// Create a fetcher on the wall clock.
    pub fn new(providers: Vec<Arc<dyn RateProvider>>, config: RateFetcherConfig) -> Self {
        Self::with_clock(providers, config, Arc::new(SystemClock))
    }

    /// Create a fetcher whose cache and `fetchedAt` stamps read `clock`.
    pub fn with_clock(
        providers: Vec<Arc<dyn RateProvider>>,
        config: RateFetcherConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            providers,
            cache: RateCache::with_clock(config.cache, clock.clone()),
            clock,
            refresh: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// Current snapshot, from cache when fresh.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> RateSnapshot {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);

        if let Some(cached) = self.cache.get() {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(cached) = self.cache.get() {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!("Rate table refreshed by concurrent request");
            return cached;
        }

        let snapshot = self.sweep().await;
        self.cache.put(snapshot.clone());
        snapshot
    }

    /// Query providers in order until one yields usable rates.
    async fn sweep(&self) -> RateSnapshot {
        self.counters.sweeps.fetch_add(1, Ordering::Relaxed);
        let mut last_error: Option<FxError> = None;

        for provider in &self.providers {
            let result = provider.fetch_rates().await.and_then(|rates| {
                if rates.is_empty() {
                    Err(FxError::NoNumericRates {
                        provider: provider.name().to_string(),
                    })
                } else {
                    Ok(rates)
                }
            });

            match result {
                Ok(rates) => {
                    let snapshot = RateSnapshot::from_provider(&rates, self.now_millis());
                    info!(
                        provider = provider.name(),
                        available = snapshot.rates.available(),
                        "Accepted rates from provider"
                    );
                    return snapshot;
                }
                Err(e) => {
                    self.counters.provider_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(provider = provider.name(), error = %e, "Provider failed to return rates");
                    last_error = Some(e);
                }
            }
        }

        self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no rate providers configured".to_string());
        error!(error = %message, "All rate providers failed, serving fallback table");

        RateSnapshot::fallback(message, self.now_millis())
    }

    fn now_millis(&self) -> i64 {
        epoch_millis(self.clock.now())
    }

    /// Drop the cached snapshot so the next fetch sweeps providers.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Get fetcher statistics.
    pub fn stats(&self) -> RateFetcherStats {
        RateFetcherStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            sweeps: self.counters.sweeps.load(Ordering::Relaxed),
            provider_failures: self.counters.provider_failures.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Fetcher statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateFetcherStats {
    pub requests: u64,
    pub cache_hits: u64,
    pub sweeps: u64,
    pub provider_failures: u64,
    pub fallbacks: u64,
}
