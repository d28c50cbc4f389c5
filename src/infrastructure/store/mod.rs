//! Store backends for the key-value facade.
//!
//! Provides two [`crate::domain::store::KeyValueStore`] implementations:
//! - [`RedisStore`] - Production Redis-backed store
//! - [`MemoryStore`] - In-process store for development, fallback and tests

mod error;
mod memory_store;
mod redis_store;

pub use error::map_redis_error;
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
