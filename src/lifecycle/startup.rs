//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Initialize subsystems in dependency order (metrics, site, listener)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use super::shutdown::Shutdown;
use super::signals::shutdown_signal;
use crate::config::{validate_config, ConfigError, SiteConfig};
use crate::http::HttpServer;
use crate::observability::metrics;
use crate::proxy::ProxyError;
use crate::site::Site;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no listen address in front-end {0}")]
    ListenAddress(String),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the site and serve it until shutdown.
pub async fn run(config: SiteConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    let address = config
        .listen_address()
        .ok_or_else(|| StartupError::ListenAddress(config.frontend_url()))?;

    if let Some(metrics_address) = config.metrics_address.as_deref() {
        match metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!(
        frontend = %config.frontend_url(),
        dir = %config.dir().display(),
        prod = config.prod,
        "Configuration loaded"
    );

    let site = Arc::new(Site::new(config)?);

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    tracing::info!(address = %address, "Listening for connections");

    HttpServer::new(site)
        .run(listener, shutdown_signal(shutdown.subscribe()))
        .await
        .map_err(StartupError::Serve)
}
