//! Rate provider capability and the normalized provider answer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use skyarchive_common::Currency;

use crate::error::{FxError, FxResult};

/// An upstream source of USD-relative rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Identifier reported as the snapshot's `provider`.
    fn name(&self) -> &str;

    /// Fetch the provider's current rate mapping.
    async fn fetch_rates(&self) -> FxResult<ProviderRates>;
}

/// A provider answer after normalization.
///
/// Codes are upper-cased and only finite, strictly positive values are kept,
/// so every `ProviderRates` satisfies the snapshot invariants by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRates {
    provider: String,
    base: Currency,
    rates: HashMap<Currency, f64>,
}

impl ProviderRates {
    /// Normalize raw `(code, value)` pairs.
    pub fn new<I, K>(provider: impl Into<String>, base: Currency, raw: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let rates = raw
            .into_iter()
            .filter(|(_, v)| v.is_finite() && *v > 0.0)
            .map(|(k, v)| (Currency::new(k.as_ref()), v))
            .collect();
        Self {
            provider: provider.into(),
            base,
            rates,
        }
    }

    /// Parse a provider body of the shape `{ "base"?: "USD", "rates": { ... } }`.
    ///
    /// Non-numeric entries are skipped; a `rates` object with no surviving
    /// value is an error so the caller moves on to the next provider.
    pub fn from_json(provider: &str, body: Value) -> FxResult<Self> {
        let Value::Object(mut body) = body else {
            return Err(FxError::Malformed {
                provider: provider.to_string(),
                reason: "invalid json".to_string(),
            });
        };

        let base = body
            .get("base")
            .and_then(Value::as_str)
            .and_then(|code| Currency::parse(code).ok())
            .unwrap_or_else(Currency::usd);

        let Some(Value::Object(raw)) = body.remove("rates") else {
            return Err(FxError::Malformed {
                provider: provider.to_string(),
                reason: "missing rates".to_string(),
            });
        };

        let rates = Self::new(
            provider,
            base,
            raw.iter().filter_map(|(k, v)| v.as_f64().map(|v| (k.as_str(), v))),
        );

        if rates.is_empty() {
            return Err(FxError::NoNumericRates {
                provider: provider.to_string(),
            });
        }

        Ok(rates)
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn base(&self) -> &Currency {
        &self.base
    }

    pub fn rates(&self) -> &HashMap<Currency, f64> {
        &self.rates
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Scripted behaviour of a [`MockRateProvider`].
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer with these raw pairs (normalized like a real provider).
    Rates(Vec<(String, f64)>),
    /// Fail with this error.
    Fail(FxError),
    /// Panic inside the fetch.
    Panic,
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    behavior: parking_lot::Mutex<MockBehavior>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Provider answering with `rates`.
    pub fn with_rates(name: impl Into<String>, rates: &[(&str, f64)]) -> Self {
        Self::new(
            name,
            MockBehavior::Rates(rates.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
        )
    }

    /// Provider failing with a 503.
    pub fn failing(name: impl Into<String>) -> Self {
        let name = name.into();
        let error = FxError::HttpStatus {
            provider: name.clone(),
            status: 503,
        };
        Self::new(name, MockBehavior::Fail(error))
    }

    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior: parking_lot::Mutex::new(behavior),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Replace the scripted behaviour.
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Number of `fetch_rates` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(&self) -> FxResult<ProviderRates> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        match behavior {
            MockBehavior::Rates(raw) => Ok(ProviderRates::new(&self.name, Currency::usd(), raw)),
            MockBehavior::Fail(err) => Err(err),
            MockBehavior::Panic => panic!("mock provider {} panicked", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_from_json_normalizes_codes_and_values() {
        let body = json!({
            "base": "USD",
            "rates": { "eur": 0.91, "GBP": "0.8", "INR": 83.2, "XXX": 0, "YYY": -1.5 }
        });

        let rates = ProviderRates::from_json("er-api", body).unwrap();

        assert_eq!(rates.provider(), "er-api");
        assert_eq!(rates.base(), &Currency::usd());
        assert_eq!(rates.rates().len(), 2);
        assert_eq!(rates.rates().get(&Currency::eur()), Some(&0.91));
        assert_eq!(rates.rates().get(&Currency::inr()), Some(&83.2));
    }

    #[test]
    fn test_from_json_defaults_base() {
        let rates = ProviderRates::from_json("p", json!({ "rates": { "EUR": 0.9 } })).unwrap();
        assert_eq!(rates.base(), &Currency::usd());
    }

    #[test]
    fn test_from_json_missing_rates() {
        let err = ProviderRates::from_json("frankfurter", json!({ "result": "error" })).unwrap_err();
        assert_eq!(err.to_string(), "frankfurter: missing rates");

        let err = ProviderRates::from_json("frankfurter", json!({ "rates": [1, 2] })).unwrap_err();
        assert!(matches!(err, FxError::Malformed { .. }));

        let err = ProviderRates::from_json("frankfurter", json!("rates")).unwrap_err();
        assert_eq!(err.to_string(), "frankfurter: invalid json");
    }

    #[test]
    fn test_from_json_no_numeric_rates() {
        let err =
            ProviderRates::from_json("exchangerate.host", json!({ "rates": { "EUR": "x" } }))
                .unwrap_err();
        assert_eq!(err.to_string(), "provider exchangerate.host returned no numeric rates");
    }

    #[tokio::test]
    async fn test_mock_provider_counts_calls() {
        let provider = MockRateProvider::with_rates("mock", &[("EUR", 0.9)]);
        provider.fetch_rates().await.unwrap();
        provider.set_behavior(MockBehavior::Fail(FxError::Transport {
            provider: "mock".into(),
            message: "reset".into(),
        }));
        assert!(provider.fetch_rates().await.is_err());
        assert_eq!(provider.calls(), 2);
    }

    proptest! {
        #[test]
        fn prop_normalized_rates_are_finite_and_positive(
            raw in proptest::collection::vec(("[a-zA-Z]{3}", proptest::num::f64::ANY), 0..32)
        ) {
            let rates = ProviderRates::new("prop", Currency::usd(), raw);
            for (code, rate) in rates.rates() {
                prop_assert!(rate.is_finite() && *rate > 0.0);
                prop_assert_eq!(code.code(), code.code().to_uppercase());
            }
        }
    }
}
