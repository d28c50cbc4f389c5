//! Request tracing for the gateway routes.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

/// Trace layer used by [`crate::routes::router`].
///
/// Every request gets an `INFO` span carrying method, URI and HTTP version.
/// The query string is part of the URI, so the key a `/redis/*` call works on
/// shows up in the span. Responses are logged with status and latency in
/// milliseconds; 5xx answers (for example `/health` with an unreachable
/// store) are additionally logged at `ERROR`.
///
/// ```text
/// INFO request{method=GET uri=/redis/set?key=visits version=HTTP/1.1}: finished processing request latency=2 ms status=200
/// INFO request{method=GET uri=/redis/get?key=visits1718000000000 version=HTTP/1.1}: finished processing request latency=1 ms status=200
/// ```
///
/// ```rust,ignore
/// Router::new()
///     .nest("/redis", redis_routes())
///     .route("/health", get(health_handler))
///     .with_state(state)
///     .layer(tracing::layer())
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::ERROR)
                .latency_unit(LatencyUnit::Millis),
        )
}
