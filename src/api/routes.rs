//! Gateway route configuration.

use crate::api::handlers::{get_handler, set_handler};
use crate::state::AppState;
use axum::{Router, routing::any};

/// Key-value gateway routes, mounted under `/redis`.
///
/// # Endpoints
///
/// - `ANY /set?key=<key>` - Write `key` with a timestamped value
/// - `ANY /get?key=<key>` - Read `key`
pub fn redis_routes() -> Router<AppState> {
    Router::new()
        .route("/set", any(set_handler))
        .route("/get", any(get_handler))
}
