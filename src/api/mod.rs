//! HTTP API layer for the key-value gateway.
//!
//! # Modules
//!
//! - [`dto`] - Query and response shapes
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
