//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `ANY  /redis/set`   - Write a timestamped value
//! - `ANY  /redis/get`   - Read a value
//! - `GET  /health`      - Health check: store PING
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes and per-request middleware, without path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/redis", api::routes::redis_routes())
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
