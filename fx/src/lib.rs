//! SkyArchive FX
//!
//! Exchange rates for the donation pages of the incident archive.
//!
//! # Features
//!
//! - Ordered fallback across public rate providers with per-call timeouts
//! - Static fallback table when every provider fails
//! - Single-slot snapshot cache with configurable TTL and injectable clock
//! - Conversion of suggested amounts with per-currency rounding
//!
//! # Example
//!
//! ```rust,ignore
//! use skyarchive_fx::{http_providers, ProviderEndpoint, RateFetcher, RateFetcherConfig};
//!
//! let providers = http_providers(ProviderEndpoint::defaults(), reqwest::Client::new(), timeout);
//! let fetcher = RateFetcher::new(providers, RateFetcherConfig::default());
//!
//! let snapshot = fetcher.fetch().await;
//! let amounts = convert_amounts(&base_suggested_amounts(), snapshot.rate_for(&Currency::inr())?, "₹")?;
//! ```

pub mod engine;
pub mod provider;
pub mod http;
pub mod cache;
pub mod conversion;
pub mod snapshot;
pub mod error;

pub use engine::{RateFetcher, RateFetcherConfig, RateFetcherStats};
pub use provider::{ProviderRates, RateProvider};
pub use http::{http_providers, HttpRateProvider, ProviderEndpoint};
pub use cache::{RateCache, RateCacheConfig};
pub use conversion::{
    base_suggested_amounts, convert_amounts, suggest_for_geo, RoundingRule, SuggestedAmounts,
    BASE_SUGGESTED_USD,
};
pub use snapshot::{RateSnapshot, RateTable, PROVIDER_FALLBACK, PROVIDER_NONE};
pub use error::{FxError, FxResult};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::{MockBehavior, MockRateProvider};
