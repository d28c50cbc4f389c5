//! HTTP request handlers for gateway endpoints.

pub mod health;
pub mod redis;

pub use health::health_handler;
pub use redis::{get_handler, set_handler};
