//! Infrastructure layer for external integrations.
//!
//! This layer implements the store contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`store`] - Redis and in-process store implementations

pub mod store;
