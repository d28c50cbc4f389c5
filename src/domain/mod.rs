//! Domain layer: value types and the store contract.
//!
//! Nothing in this layer knows about Redis or HTTP. The store contract is
//! implemented by the infrastructure layer and consumed by the facade in
//! the application layer.
//!
//! # Architecture
//!
//! - [`entities`] - Value types exchanged with the store
//! - [`store`] - The [`store::KeyValueStore`] connection-provider trait

pub mod entities;
pub mod store;

pub use store::KeyValueStore;

#[cfg(test)]
pub use store::MockKeyValueStore;
