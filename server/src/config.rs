//! Server configuration.

use std::net::SocketAddr;

use chrono::Duration;
use skyarchive_common::{time::constants, ArchiveError, Result};
use skyarchive_fx::ProviderEndpoint;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Exchange-rate configuration.
#[derive(Debug, Clone)]
pub struct RateConfig {
    /// How long a fetched snapshot is served.
    pub cache_ttl: Duration,
    /// Timeout for each provider request.
    pub provider_timeout: Duration,
    /// Providers in priority order.
    pub providers: Vec<ProviderEndpoint>,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            cache_ttl: constants::default_rate_cache_ttl(),
            provider_timeout: constants::default_provider_timeout(),
            providers: ProviderEndpoint::defaults(),
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Exchange-rate configuration.
    pub rates: RateConfig,
    /// Log level, used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log format.
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            rates: RateConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable numbers keep their defaults. An unknown provider name in
    /// `EXCHANGE_PROVIDERS` is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("SERVER_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("SERVER_LISTEN_PORT") {
            if let Ok(port) = port.trim().parse() {
                config.listen_port = port;
            }
        }

        if let Some(ttl) = lookup("EXCHANGE_CACHE_TTL_MS").as_deref().and_then(parse_millis) {
            config.rates.cache_ttl = ttl;
        }

        if let Some(timeout) = lookup("EXCHANGE_PROVIDER_TIMEOUT_MS")
            .as_deref()
            .and_then(parse_millis)
        {
            config.rates.provider_timeout = timeout;
        }

        if let Some(names) = lookup("EXCHANGE_PROVIDERS") {
            config.rates.providers = parse_providers(&names)?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.trim().to_ascii_lowercase().as_str() {
                "pretty" | "text" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            return Err(config_error("Listen port cannot be 0"));
        }

        if self.rates.cache_ttl <= Duration::zero() {
            return Err(config_error("Rate cache TTL must be positive"));
        }

        if self.rates.provider_timeout <= Duration::zero() {
            return Err(config_error("Provider timeout must be positive"));
        }

        self.socket_addr().map(|_| ())
    }

    /// Address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.listen_addr, self.listen_port)
            .parse()
            .map_err(|e| config_error(format!("Invalid listen address {}: {e}", self.listen_addr)))
    }

    /// `Cache-Control` value advertised on rate responses.
    pub fn cache_control(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.rates.cache_ttl.num_seconds(),
            constants::stale_while_revalidate().num_seconds()
        )
    }
}

/// Millisecond count as a duration; `None` when unparseable or out of range.
fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim().parse::<i64>().ok().and_then(Duration::try_milliseconds)
}

fn parse_providers(names: &str) -> Result<Vec<ProviderEndpoint>> {
    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            ProviderEndpoint::defaults()
                .into_iter()
                .find(|endpoint| endpoint.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| config_error(format!("Unknown rate provider: {name}")))
        })
        .collect()
}

fn config_error(message: impl Into<String>) -> ArchiveError {
    ArchiveError::ConfigurationError(message.into())
}
