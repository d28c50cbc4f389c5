//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, router construction and the Axum server
//! lifecycle, including graceful shutdown.

use crate::config::Config;
use crate::domain::store::KeyValueStore;
use crate::infrastructure::store::{MemoryStore, RedisStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

/// Picks the store backend for the configuration.
///
/// Uses Redis when configured and reachable within the configured number of
/// attempts; otherwise falls back to the in-process [`MemoryStore`].
pub async fn build_store(config: &Config) -> Arc<dyn KeyValueStore> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Redis not configured, using in-process store");
        return Arc::new(MemoryStore::new());
    };

    match RedisStore::connect_with_retry(redis_url, config.redis_connect_retries).await {
        Ok(redis) => {
            tracing::info!("Store enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using in-process store.", e);
            Arc::new(MemoryStore::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Store backend (Redis or in-process fallback)
/// - Axum HTTP server
///
/// The store handle lives in [`AppState`] and is dropped once the server
/// has drained after a shutdown signal.
///
/// # Errors
///
/// Returns an error if:
/// - The listen address is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = build_store(&config).await;
    let state = AppState::new(store);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
