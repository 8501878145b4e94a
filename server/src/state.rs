//! Shared handler state.

use std::sync::Arc;

use skyarchive_common::{ArchiveError, DurationExt, Result};
use skyarchive_fx::{http_providers, RateCacheConfig, RateFetcher, RateFetcherConfig};

use crate::config::ServerConfig;
use crate::metrics::{Metrics, SharedMetrics};

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<RateFetcher>,
    pub metrics: SharedMetrics,
    /// `Cache-Control` value for successful rate responses.
    pub cache_control: String,
}

impl AppState {
    /// Build state with HTTP providers from configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("skyarchive/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArchiveError::ConfigurationError(format!("HTTP client: {e}")))?;

        let providers = http_providers(
            config.rates.providers.clone(),
            client,
            config.rates.provider_timeout.as_std(),
        );
        let fetcher = RateFetcher::new(
            providers,
            RateFetcherConfig {
                cache: RateCacheConfig {
                    ttl: config.rates.cache_ttl,
                },
            },
        );

        Ok(Self::with_fetcher(Arc::new(fetcher), config.cache_control()))
    }

    /// Build state around an existing fetcher.
    pub fn with_fetcher(fetcher: Arc<RateFetcher>, cache_control: impl Into<String>) -> Self {
        Self {
            fetcher,
            metrics: Arc::new(Metrics::new()),
            cache_control: cache_control.into(),
        }
    }
}
