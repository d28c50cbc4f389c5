//! List operations.
//!
//! Indices follow the store convention: `0` is the head, `-1` the tail.

use super::{KvService, observe, owned};
use crate::error::StoreResult;
use std::time::Duration;

impl KvService {
    /// Returns elements `start..=end`; `l_get(key, 0, -1)` returns the whole list.
    pub async fn l_get(&self, key: &str, start: i64, end: i64) -> StoreResult<Vec<String>> {
        observe("lrange", key, self.store.lrange(key, start, end).await)
    }

    pub async fn l_size(&self, key: &str) -> StoreResult<u64> {
        observe("llen", key, self.store.llen(key).await)
    }

    pub async fn l_get_index(&self, key: &str, index: i64) -> StoreResult<Option<String>> {
        observe("lindex", key, self.store.lindex(key, index).await)
    }

    /// Appends one value to the tail.
    pub async fn l_push(&self, key: &str, value: &str) -> StoreResult<()> {
        self.l_set(key, &[value]).await
    }

    /// Like [`Self::l_push`], then applies a TTL when `ttl_seconds > 0`.
    pub async fn l_push_with_ttl(&self, key: &str, value: &str, ttl_seconds: i64) -> StoreResult<()> {
        self.l_set_with_ttl(key, &[value], ttl_seconds).await
    }

    /// Appends all values to the tail, in order.
    pub async fn l_set(&self, key: &str, values: &[impl AsRef<str>]) -> StoreResult<()> {
        let values = owned(values);
        observe("rpush", key, self.store.rpush(key, &values).await)?;
        Ok(())
    }

    /// Like [`Self::l_set`], then applies a TTL when `ttl_seconds > 0`.
    pub async fn l_set_with_ttl(
        &self,
        key: &str,
        values: &[impl AsRef<str>],
        ttl_seconds: i64,
    ) -> StoreResult<()> {
        self.l_set(key, values).await?;
        self.set_expire(key, ttl_seconds).await
    }

    /// Overwrites the element at `index`.
    ///
    /// # Errors
    ///
    /// Fails when the key is absent or the index is out of range.
    pub async fn l_update_index(&self, key: &str, index: i64, value: &str) -> StoreResult<()> {
        observe("lset", key, self.store.lset(key, index, value).await)
    }

    /// Removes up to `count` occurrences of `value` (see the store's `LREM`).
    pub async fn l_remove(&self, key: &str, count: i64, value: &str) -> StoreResult<u64> {
        observe("lrem", key, self.store.lrem(key, count, value).await)
    }

    /// Appends values to the tail and sets the list's TTL. Returns the new length.
    ///
    /// The TTL has second granularity; anything under one second leaves the
    /// list without an expiry.
    pub async fn l_right_push_all(
        &self,
        key: &str,
        values: &[impl AsRef<str>],
        ttl: Duration,
    ) -> StoreResult<u64> {
        let values = owned(values);
        let len = observe("rpush", key, self.store.rpush(key, &values).await)?;
        self.set_expire(key, whole_seconds(ttl)).await?;
        Ok(len)
    }

    pub async fn l_right_push(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<u64> {
        self.l_right_push_all(key, &[value], ttl).await
    }

    /// Prepends values one by one (the last value ends up at the head) and
    /// sets the list's TTL. Returns the new length.
    pub async fn l_left_push_all(
        &self,
        key: &str,
        values: &[impl AsRef<str>],
        ttl: Duration,
    ) -> StoreResult<u64> {
        let values = owned(values);
        let len = observe("lpush", key, self.store.lpush(key, &values).await)?;
        self.set_expire(key, whole_seconds(ttl)).await?;
        Ok(len)
    }

    pub async fn l_left_push(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<u64> {
        self.l_left_push_all(key, &[value], ttl).await
    }

    pub async fn l_right_pop(&self, key: &str) -> StoreResult<Option<String>> {
        observe("rpop", key, self.store.rpop(key).await)
    }

    pub async fn l_left_pop(&self, key: &str) -> StoreResult<Option<String>> {
        observe("lpop", key, self.store.lpop(key).await)
    }
}

/// Whole seconds of `ttl`, saturating at `i64::MAX`.
fn whole_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}
