//! Redis error mapping to StoreError.

use crate::error::StoreError;

/// Maps Redis errors to [`StoreError`].
pub fn map_redis_error(err: redis::RedisError) -> StoreError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        StoreError::Connection(err.to_string())
    } else if err.code() == Some("WRONGTYPE") {
        StoreError::WrongType(err.to_string())
    } else {
        StoreError::Operation(err.to_string())
    }
}
