//! Scalar (string) operations.

use super::{KvService, observe, positive_ttl};
use crate::domain::entities::SetCondition;
use crate::error::{StoreError, StoreResult};

impl KvService {
    /// Returns the value at `key`, `None` when absent.
    pub async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        observe("get", key, self.store.get(key).await)
    }

    pub async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        observe(
            "set",
            key,
            self.store.set(key, value, SetCondition::Always, None).await,
        )?;
        Ok(())
    }

    /// Writes `value` with a TTL when `ttl_seconds > 0`, otherwise behaves
    /// exactly like [`Self::set`].
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: i64) -> StoreResult<()> {
        observe(
            "set",
            key,
            self.store
                .set(key, value, SetCondition::Always, positive_ttl(ttl_seconds))
                .await,
        )?;
        Ok(())
    }

    /// Replaces the value at `key` and returns the previous one.
    pub async fn get_and_set(&self, key: &str, value: &str) -> StoreResult<Option<String>> {
        observe("getset", key, self.store.get_set(key, value).await)
    }

    /// Writes only if `key` does not exist. Returns whether the write happened.
    pub async fn set_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        self.set_if_absent_with_ttl(key, value, 0).await
    }

    /// Like [`Self::set_if_absent`], attaching a TTL when `ttl_seconds > 0`.
    pub async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: i64,
    ) -> StoreResult<bool> {
        observe(
            "setnx",
            key,
            self.store
                .set(key, value, SetCondition::IfAbsent, positive_ttl(ttl_seconds))
                .await,
        )
    }

    /// Writes only if `key` already exists. Returns whether the write happened.
    pub async fn set_if_present(&self, key: &str, value: &str) -> StoreResult<bool> {
        self.set_if_present_with_ttl(key, value, 0).await
    }

    /// Like [`Self::set_if_present`], attaching a TTL when `ttl_seconds > 0`.
    pub async fn set_if_present_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: i64,
    ) -> StoreResult<bool> {
        observe(
            "setxx",
            key,
            self.store
                .set(key, value, SetCondition::IfPresent, positive_ttl(ttl_seconds))
                .await,
        )
    }

    /// Adds `delta` to the counter at `key` and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] without touching the store
    /// when `delta` is negative.
    pub async fn increment(&self, key: &str, delta: i64) -> StoreResult<i64> {
        if delta < 0 {
            return Err(StoreError::invalid_argument("delta must be positive"));
        }
        observe("incrby", key, self.store.incr_by(key, delta).await)
    }

    /// Subtracts `delta` from the counter at `key` and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] without touching the store
    /// when `delta` is negative.
    pub async fn decrement(&self, key: &str, delta: i64) -> StoreResult<i64> {
        if delta < 0 {
            return Err(StoreError::invalid_argument("delta must be positive"));
        }
        observe("incrby", key, self.store.incr_by(key, -delta).await)
    }
}
