//! Handlers for the `/redis/set` and `/redis/get` gateway routes.
//!
//! Both routes accept any method and read `key` from the query string. They
//! never surface store errors to the client: failures are logged by the
//! facade and answered with the route's benign default.

use axum::extract::{Query, State};
use chrono::Utc;
use tracing::debug;

use crate::api::dto::key_query::KeyQuery;
use crate::state::AppState;

/// Writes `key` with the value `key` followed by the current epoch
/// milliseconds.
///
/// # Endpoint
///
/// `ANY /redis/set?key=<key>`
///
/// # Response
///
/// `true` when the write succeeded, `false` when `key` is missing or the
/// store failed.
pub async fn set_handler(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> String {
    let Some(key) = query.key() else {
        debug!("Rejecting /redis/set without key");
        return false.to_string();
    };

    let value = format!("{}{}", key, Utc::now().timestamp_millis());
    state.kv.set(key, &value).await.is_ok().to_string()
}

/// Reads `key`.
///
/// # Endpoint
///
/// `ANY /redis/get?key=<key>`
///
/// # Response
///
/// The raw value, or an empty body when the key is absent, `key` is missing,
/// or the store failed.
pub async fn get_handler(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> String {
    let Some(key) = query.key() else {
        debug!("Rejecting /redis/get without key");
        return String::new();
    };

    state.kv.get(key).await.ok().flatten().unwrap_or_default()
}
