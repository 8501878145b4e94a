//! HTTP server lifecycle.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::api::create_router;
use crate::config::ServerConfig;
use crate::state::AppState;

/// The exchange-rate service.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a server with HTTP rate providers from `config`.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    /// Bind and serve until `shutdown` resolves.
    #[instrument(skip(self, shutdown))]
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;

        info!(
            listen_addr = %listener.local_addr()?,
            providers = ?self.state.fetcher.provider_names(),
            cache_ttl_secs = self.config.rates.cache_ttl.num_seconds(),
            "Exchange rate service listening"
        );

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Exchange rate service stopped");
        Ok(())
    }
}
