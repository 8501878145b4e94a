//! Single-slot rate cache with TTL support.

use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use skyarchive_common::{time::constants, SharedClock, SystemClock, Timestamp};
use tracing::debug;

use crate::snapshot::RateSnapshot;

/// Cached snapshot plus the time it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: RateSnapshot,
    inserted_at: Timestamp,
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// Maximum age of a served snapshot.
    pub ttl: Duration,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: constants::default_rate_cache_ttl(),
        }
    }
}

/// Holds at most one snapshot; a newer `put` always replaces the old one.
pub struct RateCache {
    slot: RwLock<Option<CacheEntry>>,
    config: RateCacheConfig,
    clock: SharedClock,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a new rate cache on the wall clock.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a rate cache reading time from `clock`.
    pub fn with_clock(config: RateCacheConfig, clock: SharedClock) -> Self {
        Self {
            slot: RwLock::new(None),
            config,
            clock,
        }
    }

    /// The held snapshot if it is younger than the TTL.
    pub fn get(&self) -> Option<RateSnapshot> {
        let slot = self.slot.read();
        let Some(entry) = slot.as_ref() else {
            debug!("Rate cache empty");
            return None;
        };

        let age = self.clock.now().signed_duration_since(entry.inserted_at);
        if age < self.config.ttl {
            debug!(age_ms = age.num_milliseconds(), provider = %entry.snapshot.provider, "Cache hit");
            Some(entry.snapshot.clone())
        } else {
            debug!(age_ms = age.num_milliseconds(), "Cache entry expired");
            None
        }
    }

    /// Replace the held snapshot and stamp it with the current time.
    pub fn put(&self, snapshot: RateSnapshot) {
        let entry = CacheEntry {
            snapshot,
            inserted_at: self.clock.now(),
        };
        *self.slot.write() = Some(entry);
    }

    /// Drop the held snapshot.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyarchive_common::ManualClock;

    fn cache_with_clock(ttl: Duration) -> (RateCache, ManualClock) {
        let clock = ManualClock::default();
        let cache = RateCache::with_clock(RateCacheConfig { ttl }, Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_cache_miss_when_empty() {
        let cache = RateCache::new();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_cache_put_and_get() {
        let (cache, _clock) = cache_with_clock(Duration::minutes(1));
        let snapshot = RateSnapshot::fallback("down", 42);

        cache.put(snapshot.clone());

        assert_eq!(cache.get(), Some(snapshot));
    }

    #[test]
    fn test_cache_ttl_boundary() {
        let (cache, clock) = cache_with_clock(Duration::milliseconds(1000));
        cache.put(RateSnapshot::fallback("down", 1));

        clock.advance(Duration::milliseconds(999));
        assert!(cache.get().is_some());

        // Age equal to the TTL is already stale.
        clock.advance(Duration::milliseconds(1));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_put_replaces_entry() {
        let (cache, clock) = cache_with_clock(Duration::seconds(10));
        cache.put(RateSnapshot::fallback("first", 1));
        clock.advance(Duration::seconds(11));
        assert!(cache.get().is_none());

        cache.put(RateSnapshot::fallback("second", 2));
        let held = cache.get().unwrap();
        assert_eq!(held.error.as_deref(), Some("second"));

        // The replacement is stamped at put time.
        clock.advance(Duration::seconds(9));
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_cache_clear() {
        let cache = RateCache::new();
        cache.put(RateSnapshot::fallback("down", 1));
        cache.clear();
        assert!(cache.get().is_none());
    }
}
