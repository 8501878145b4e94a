//! SkyArchive Server
//!
//! HTTP front for the rate fetcher: the exchange-rate endpoint, localized
//! suggested donation amounts, health and Prometheus metrics.

pub mod api;
pub mod config;
pub mod metrics;
pub mod server;
pub mod state;

pub use api::create_router;
pub use config::{LogFormat, RateConfig, ServerConfig};
pub use server::Server;
pub use state::AppState;
