//! # KV Gateway
//!
//! A typed key-value facade over Redis with a small HTTP gateway, built with
//! Axum.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Value types and the [`domain::KeyValueStore`] trait
//! - **Application Layer** ([`application`]) - The [`application::services::KvService`] facade
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-process store backends
//! - **API Layer** ([`api`]) - `/redis/*` and `/health` handlers
//!
//! ## Features
//!
//! - Scalar, hash, set, list and sorted-set operations with TTL helpers
//! - Lazy cursor scans over hashes and sorted sets
//! - Pipelined and native multi-key reads
//! - Publish passthrough
//! - In-process fallback store when Redis is not configured
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379"  # Optional
//! cargo run
//!
//! curl "http://localhost:3000/redis/set?key=greeting"
//! curl "http://localhost:3000/redis/get?key=greeting"
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::{StoreError, StoreResult};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{KvService, ScanStream};
    pub use crate::domain::KeyValueStore;
    pub use crate::domain::entities::{Expiry, ScanOptions, ScoredMember};
    pub use crate::error::{StoreError, StoreResult};
    pub use crate::infrastructure::store::{MemoryStore, RedisStore};
    pub use crate::state::AppState;
}
