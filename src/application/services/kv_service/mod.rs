//! Key-value facade service.
//!
//! [`KvService`] is the single entry point callers use to talk to the store.
//! It applies the facade's argument policy on top of the raw commands of
//! [`KeyValueStore`]:
//!
//! - a TTL of `0` or less means "no expiry" and never reaches the store
//! - counters only accept non-negative deltas; decrements negate them
//! - empty or inverted ranges short-circuit without a round trip
//! - caller-owned collections are copied before they are handed over
//!
//! # Errors
//!
//! Every operation returns [`StoreResult`]. A missing key is a successful,
//! empty answer (`None`, `false`, `0`, empty collection); a failed store call
//! is an `Err` carrying the cause. Failures are logged and counted under
//! `kv_facade_errors_total{operation}` before being returned. Nothing is
//! retried.
//!
//! # Submodules
//!
//! Operations are grouped by data model: [`keys`], [`values`], [`hashes`],
//! [`sets`], [`lists`], [`sorted_sets`], [`scan`], [`batch`] and [`pubsub`].

mod batch;
mod hashes;
mod keys;
mod lists;
mod pubsub;
mod scan;
mod sets;
mod sorted_sets;
mod values;

pub use scan::ScanStream;

use crate::domain::store::KeyValueStore;
use crate::error::StoreResult;
use std::sync::Arc;
use tracing::warn;

/// Typed facade over a [`KeyValueStore`].
///
/// Holds nothing but a shared handle to the store, so it is cheap to share
/// behind an `Arc` and safe to call from any number of tasks.
pub struct KvService {
    store: Arc<dyn KeyValueStore>,
}

impl KvService {
    /// Creates a facade over the given store handle.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

/// Logs and counts a failed store call, passing the result through.
fn observe<T>(operation: &'static str, key: &str, result: StoreResult<T>) -> StoreResult<T> {
    if let Err(e) = &result {
        warn!("{} failed for '{}': {}", operation, key, e);
        metrics::counter!("kv_facade_errors_total", "operation" => operation).increment(1);
    }
    result
}

/// TTL policy shared by every `*_with_ttl` operation.
fn positive_ttl(seconds: i64) -> Option<u64> {
    (seconds > 0).then_some(seconds as u64)
}

/// Copies caller-owned strings into a fresh collection.
fn owned(items: &[impl AsRef<str>]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_string()).collect()
}
