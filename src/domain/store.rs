//! Connection-provider contract for the key-value store.
//!
//! Each method maps to a single store command (or a single pipeline) and
//! performs exactly one round trip. Argument normalization, TTL policy and
//! precondition checks live in [`crate::application::services::KvService`],
//! not here.
//!
//! # Implementations
//!
//! - [`crate::infrastructure::store::RedisStore`] - Redis via `ConnectionManager`
//! - [`crate::infrastructure::store::MemoryStore`] - In-process keyspace
//! - Test mocks available with `cfg(test)`

use crate::domain::entities::{RangeOrder, ScanPage, ScoredMember, SetCondition};
use crate::error::StoreResult;
use async_trait::async_trait;

/// A shared, thread-safe handle to a key-value store.
///
/// Indices follow the store convention: negative values count from the
/// tail, `-1` being the last element.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    // ── Keys ────────────────────────────────────────────────────────────────

    /// Sets a TTL on `key`. Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, seconds: u64) -> StoreResult<bool>;

    /// Returns the raw `TTL` reply (`-2` missing, `-1` no expiry).
    async fn ttl(&self, key: &str) -> StoreResult<i64>;

    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Deletes one key. Returns whether it existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Deletes several keys in one command. Returns how many existed.
    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64>;

    /// Lists keys matching a glob-style pattern.
    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;

    async fn ping(&self) -> StoreResult<()>;

    // ── Strings ─────────────────────────────────────────────────────────────

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` under `condition`, optionally with a TTL in seconds.
    /// Returns whether the write happened.
    async fn set(
        &self,
        key: &str,
        value: &str,
        condition: SetCondition,
        ttl_seconds: Option<u64>,
    ) -> StoreResult<bool>;

    /// Replaces the value and returns the previous one.
    async fn get_set(&self, key: &str, value: &str) -> StoreResult<Option<String>>;

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64>;

    async fn mget(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>>;

    async fn mset(&self, entries: &[(String, String)]) -> StoreResult<()>;

    /// Issues one `GET` per key inside a single pipeline and returns the raw
    /// replies in request order.
    async fn pipelined_get(&self, keys: &[String]) -> StoreResult<Vec<Option<Vec<u8>>>>;

    // ── Hashes ──────────────────────────────────────────────────────────────

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    async fn hget_all(&self, key: &str) -> StoreResult<Vec<(String, String)>>;

    async fn hmget(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>>;

    /// Returns `true` if the field is new.
    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<bool>;

    async fn hset_many(&self, key: &str, entries: &[(String, String)]) -> StoreResult<()>;

    async fn hdel(&self, key: &str, fields: &[String]) -> StoreResult<u64>;

    async fn hexists(&self, key: &str, field: &str) -> StoreResult<bool>;

    async fn hincr_by_float(&self, key: &str, field: &str, delta: f64) -> StoreResult<f64>;

    async fn hscan(
        &self,
        key: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage<(String, String)>>;

    // ── Sets ────────────────────────────────────────────────────────────────

    async fn smembers(&self, key: &str) -> StoreResult<Vec<String>>;

    async fn srandmember(&self, key: &str) -> StoreResult<Option<String>>;

    async fn sismember(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Returns how many members were newly added.
    async fn sadd(&self, key: &str, members: &[String]) -> StoreResult<u64>;

    async fn scard(&self, key: &str) -> StoreResult<u64>;

    async fn srem(&self, key: &str, members: &[String]) -> StoreResult<u64>;

    // ── Lists ───────────────────────────────────────────────────────────────

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>>;

    async fn llen(&self, key: &str) -> StoreResult<u64>;

    async fn lindex(&self, key: &str, index: i64) -> StoreResult<Option<String>>;

    async fn lset(&self, key: &str, index: i64, value: &str) -> StoreResult<()>;

    /// Appends values to the tail. Returns the new length.
    async fn rpush(&self, key: &str, values: &[String]) -> StoreResult<u64>;

    /// Prepends values to the head, one after another. Returns the new length.
    async fn lpush(&self, key: &str, values: &[String]) -> StoreResult<u64>;

    async fn rpop(&self, key: &str) -> StoreResult<Option<String>>;

    async fn lpop(&self, key: &str) -> StoreResult<Option<String>>;

    /// Removes up to `|count|` occurrences of `value`: from the head when
    /// positive, from the tail when negative, all when zero.
    async fn lrem(&self, key: &str, count: i64, value: &str) -> StoreResult<u64>;

    // ── Sorted sets ─────────────────────────────────────────────────────────

    /// Returns how many members were newly added.
    async fn zadd(&self, key: &str, members: &[ScoredMember]) -> StoreResult<u64>;

    async fn zcard(&self, key: &str) -> StoreResult<u64>;

    async fn zincr_by(&self, key: &str, member: &str, delta: f64) -> StoreResult<f64>;

    async fn zrem(&self, key: &str, members: &[String]) -> StoreResult<u64>;

    /// Members between ranks `start` and `stop`, inclusive.
    async fn zrange(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: RangeOrder,
    ) -> StoreResult<Vec<String>>;

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: RangeOrder,
    ) -> StoreResult<Vec<ScoredMember>>;

    /// Members whose score lies in `[min, max]`, walked in `order`.
    async fn zrange_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        order: RangeOrder,
    ) -> StoreResult<Vec<ScoredMember>>;

    async fn zrank(&self, key: &str, member: &str, order: RangeOrder) -> StoreResult<Option<u64>>;

    async fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<f64>>;

    async fn zcount(&self, key: &str, min: f64, max: f64) -> StoreResult<u64>;

    async fn zrem_range_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<u64>;

    async fn zscan(
        &self,
        key: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage<ScoredMember>>;

    // ── Pub/Sub ─────────────────────────────────────────────────────────────

    /// Publishes a message. Returns the number of subscribers that received it.
    async fn publish(&self, channel: &str, message: &str) -> StoreResult<u64>;
}
