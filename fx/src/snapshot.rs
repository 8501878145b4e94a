//! Rate snapshot: the unit the fetcher produces and the cache holds.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use skyarchive_common::Currency;

use crate::provider::ProviderRates;

/// Provider id reported when every upstream failed.
pub const PROVIDER_FALLBACK: &str = "fallback";

/// Provider id reported when the fetch itself broke.
pub const PROVIDER_NONE: &str = "none";

/// Note attached to fallback snapshots.
pub const FALLBACK_NOTE: &str = "All upstream providers failed; returning fallback rates.";

/// Approximate USD rates served when no provider answers.
pub const FALLBACK_RATES: [(&str, f64); 8] = [
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.78),
    ("INR", 83.0),
    ("CAD", 1.34),
    ("AUD", 1.5),
    ("JPY", 156.0),
    ("CNY", 7.2),
];

/// Allow-listed rates in response order; every supported code is present.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    entries: Vec<(Currency, Option<f64>)>,
}

impl RateTable {
    /// Restrict a provider mapping to the allow-list. Missing codes and
    /// values that are not finite and positive become `None`.
    pub fn restrict(rates: &HashMap<Currency, f64>) -> Self {
        let entries = Currency::supported()
            .map(|currency| {
                let rate = rates
                    .get(&currency)
                    .copied()
                    .filter(|r| r.is_finite() && *r > 0.0);
                (currency, rate)
            })
            .collect();
        Self { entries }
    }

    /// Table with every supported code set to `None`.
    pub fn empty() -> Self {
        Self::restrict(&HashMap::new())
    }

    /// The static fallback table.
    pub fn fallback() -> Self {
        let rates = FALLBACK_RATES
            .iter()
            .map(|(code, rate)| (Currency::new(*code), *rate))
            .collect();
        Self::restrict(&rates)
    }

    /// Rate for a currency, `None` when absent or not allow-listed.
    pub fn get(&self, currency: &Currency) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == currency)
            .and_then(|(_, rate)| *rate)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Currency, Option<f64>)> {
        self.entries.iter().map(|(c, r)| (c, *r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of codes with a usable rate.
    pub fn available(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_some()).count()
    }
}

impl Serialize for RateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (currency, rate) in &self.entries {
            map.serialize_entry(currency.code(), rate)?;
        }
        map.end()
    }
}

/// Result of one rate fetch, including provenance.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    /// Currency the rates are relative to.
    pub base: Currency,
    /// Allow-listed rates.
    pub rates: RateTable,
    /// Milliseconds since the Unix epoch.
    pub fetched_at: i64,
    /// Upstream id, or one of the sentinels.
    pub provider: String,
    /// Diagnostic, set only on fallback paths.
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RateSnapshot {
    /// Snapshot built from a provider's normalized answer.
    pub fn from_provider(rates: &ProviderRates, fetched_at: i64) -> Self {
        Self {
            base: rates.base().clone(),
            rates: RateTable::restrict(rates.rates()),
            fetched_at,
            provider: rates.provider().to_string(),
            error: None,
            note: None,
        }
    }

    /// Snapshot from the static table after all providers failed.
    pub fn fallback(error: impl Into<String>, fetched_at: i64) -> Self {
        Self {
            base: Currency::usd(),
            rates: RateTable::fallback(),
            fetched_at,
            provider: PROVIDER_FALLBACK.to_string(),
            error: Some(error.into()),
            note: Some(FALLBACK_NOTE.to_string()),
        }
    }

    /// Snapshot with no rates at all, for unexpected internal failures.
    pub fn unavailable(error: impl Into<String>, fetched_at: i64) -> Self {
        Self {
            base: Currency::usd(),
            rates: RateTable::empty(),
            fetched_at,
            provider: PROVIDER_NONE.to_string(),
            error: Some(error.into()),
            note: None,
        }
    }

    /// Whether the rates came from the static table.
    pub fn is_fallback(&self) -> bool {
        self.provider == PROVIDER_FALLBACK
    }

    pub fn rate_for(&self, currency: &Currency) -> Option<f64> {
        self.rates.get(currency)
    }
}
