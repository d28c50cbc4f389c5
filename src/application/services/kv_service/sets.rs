//! Set operations.

use super::{KvService, observe, owned};
use crate::error::StoreResult;
use std::collections::HashSet;

impl KvService {
    /// Returns all members; empty when the key is absent.
    pub async fn s_members(&self, key: &str) -> StoreResult<HashSet<String>> {
        let members = observe("smembers", key, self.store.smembers(key).await)?;
        Ok(members.into_iter().collect())
    }

    pub async fn s_random_member(&self, key: &str) -> StoreResult<Option<String>> {
        observe("srandmember", key, self.store.srandmember(key).await)
    }

    pub async fn s_is_member(&self, key: &str, member: &str) -> StoreResult<bool> {
        observe("sismember", key, self.store.sismember(key, member).await)
    }

    /// Adds members and returns how many were not already present.
    pub async fn s_add(&self, key: &str, members: &[impl AsRef<str>]) -> StoreResult<u64> {
        let members = owned(members);
        observe("sadd", key, self.store.sadd(key, &members).await)
    }

    /// Like [`Self::s_add`], then applies a TTL when `ttl_seconds > 0`.
    pub async fn s_add_with_ttl(
        &self,
        key: &str,
        ttl_seconds: i64,
        members: &[impl AsRef<str>],
    ) -> StoreResult<u64> {
        let added = self.s_add(key, members).await?;
        self.set_expire(key, ttl_seconds).await?;
        Ok(added)
    }

    pub async fn s_size(&self, key: &str) -> StoreResult<u64> {
        observe("scard", key, self.store.scard(key).await)
    }

    /// Removes members and returns how many were present.
    pub async fn s_remove(&self, key: &str, members: &[impl AsRef<str>]) -> StoreResult<u64> {
        let members = owned(members);
        observe("srem", key, self.store.srem(key, &members).await)
    }
}
