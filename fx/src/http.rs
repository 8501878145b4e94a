//! HTTP rate providers for the public exchange-rate APIs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{FxError, FxResult};
use crate::provider::{ProviderRates, RateProvider};

/// Where a provider lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub name: String,
    pub url: String,
}

impl ProviderEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn exchangerate_host() -> Self {
        Self::new(
            "exchangerate.host",
            "https://api.exchangerate.host/latest?base=USD&places=6",
        )
    }

    pub fn er_api() -> Self {
        Self::new("er-api", "https://open.er-api.com/v6/latest/USD")
    }

    pub fn frankfurter() -> Self {
        Self::new("frankfurter", "https://api.frankfurter.app/latest?from=USD")
    }

    /// Public providers in priority order.
    pub fn defaults() -> Vec<Self> {
        vec![Self::exchangerate_host(), Self::er_api(), Self::frankfurter()]
    }
}

/// Provider answering a plain unauthenticated GET with a `rates` body.
pub struct HttpRateProvider {
    endpoint: ProviderEndpoint,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpRateProvider {
    pub fn new(endpoint: ProviderEndpoint, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            endpoint,
            client,
            timeout,
        }
    }

    fn request_error(&self, err: reqwest::Error) -> FxError {
        if err.is_timeout() {
            FxError::Timeout {
                provider: self.endpoint.name.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FxError::Transport {
                provider: self.endpoint.name.clone(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        &self.endpoint.name
    }

    async fn fetch_rates(&self) -> FxResult<ProviderRates> {
        debug!(provider = %self.endpoint.name, url = %self.endpoint.url, "Requesting rates");

        // The timeout covers the whole exchange, body included.
        let response = self
            .client
            .get(&self.endpoint.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::HttpStatus {
                provider: self.endpoint.name.clone(),
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(e)
            } else {
                FxError::Malformed {
                    provider: self.endpoint.name.clone(),
                    reason: format!("invalid json: {e}"),
                }
            }
        })?;

        ProviderRates::from_json(&self.endpoint.name, body)
    }
}

/// Build HTTP providers for `endpoints`, sharing one client.
pub fn http_providers(
    endpoints: Vec<ProviderEndpoint>,
    client: reqwest::Client,
    timeout: Duration,
) -> Vec<Arc<dyn RateProvider>> {
    endpoints
        .into_iter()
        .map(|endpoint| {
            Arc::new(HttpRateProvider::new(endpoint, client.clone(), timeout)) as Arc<dyn RateProvider>
        })
        .collect()
}
