//! Application layer services.
//!
//! This layer turns raw store commands into the typed facade consumed by the
//! HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::kv_service::KvService`] - Key-value facade over strings, hashes,
//!   sets, lists, sorted sets, scans, batches and publish

pub mod services;
