//! Hash operations.

use super::{KvService, observe, owned};
use crate::error::StoreResult;
use std::collections::HashMap;

impl KvService {
    pub async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        observe("hget", key, self.store.hget(key, field).await)
    }

    /// Returns every field of the hash; empty when the key is absent.
    pub async fn hget_all(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let entries = observe("hgetall", key, self.store.hget_all(key).await)?;
        Ok(entries.into_iter().collect())
    }

    /// Returns the values of `fields`, in order, `None` for missing ones.
    pub async fn hmget(
        &self,
        key: &str,
        fields: &[impl AsRef<str>],
    ) -> StoreResult<Vec<Option<String>>> {
        let fields = owned(fields);
        observe("hmget", key, self.store.hmget(key, &fields).await)
    }

    /// Writes all entries of `map` into the hash.
    pub async fn hmset(&self, key: &str, map: &HashMap<String, String>) -> StoreResult<()> {
        let entries: Vec<(String, String)> =
            map.iter().map(|(f, v)| (f.clone(), v.clone())).collect();
        observe("hset", key, self.store.hset_many(key, &entries).await)
    }

    /// Like [`Self::hmset`], then applies a TTL to the whole hash when
    /// `ttl_seconds > 0`.
    pub async fn hmset_with_ttl(
        &self,
        key: &str,
        map: &HashMap<String, String>,
        ttl_seconds: i64,
    ) -> StoreResult<()> {
        self.hmset(key, map).await?;
        self.set_expire(key, ttl_seconds).await
    }

    /// Writes one field, creating the hash if needed.
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        observe("hset", key, self.store.hset(key, field, value).await)?;
        Ok(())
    }

    /// Like [`Self::hset`], then applies a TTL to the whole hash when
    /// `ttl_seconds > 0`. An existing TTL on the hash is replaced.
    pub async fn hset_with_ttl(
        &self,
        key: &str,
        field: &str,
        value: &str,
        ttl_seconds: i64,
    ) -> StoreResult<()> {
        self.hset(key, field, value).await?;
        self.set_expire(key, ttl_seconds).await
    }

    /// Removes fields and returns how many existed.
    pub async fn hdel(&self, key: &str, fields: &[impl AsRef<str>]) -> StoreResult<u64> {
        let fields = owned(fields);
        observe("hdel", key, self.store.hdel(key, &fields).await)
    }

    pub async fn hhas_key(&self, key: &str, field: &str) -> StoreResult<bool> {
        observe("hexists", key, self.store.hexists(key, field).await)
    }

    /// Adds `by` to a numeric field, creating it at `0` if needed.
    pub async fn hincr(&self, key: &str, field: &str, by: f64) -> StoreResult<f64> {
        observe("hincrbyfloat", key, self.store.hincr_by_float(key, field, by).await)
    }

    /// Subtracts `by` from a numeric field.
    pub async fn hdecr(&self, key: &str, field: &str, by: f64) -> StoreResult<f64> {
        observe("hincrbyfloat", key, self.store.hincr_by_float(key, field, -by).await)
    }
}
