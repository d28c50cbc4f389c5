//! Business logic services for the application layer.

pub mod kv_service;

pub use kv_service::{KvService, ScanStream};
