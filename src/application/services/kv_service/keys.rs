//! Expiry control, existence checks and deletion.

use super::{KvService, observe, positive_ttl};
use crate::domain::entities::Expiry;
use crate::error::StoreResult;
use tracing::debug;

impl KvService {
    /// Sets a TTL on `key` when `seconds > 0`. A non-positive value leaves
    /// the key untouched. The new TTL replaces any previous one.
    pub async fn set_expire(&self, key: &str, seconds: i64) -> StoreResult<()> {
        let Some(ttl) = positive_ttl(seconds) else {
            return Ok(());
        };
        observe("expire", key, self.store.expire(key, ttl).await)?;
        Ok(())
    }

    /// Returns the remaining lifetime of `key` in the store's convention.
    pub async fn get_expire(&self, key: &str) -> StoreResult<Expiry> {
        let reply = observe("ttl", key, self.store.ttl(key).await)?;
        Ok(Expiry::from_ttl_reply(reply))
    }

    pub async fn exists(&self, key: &str) -> StoreResult<bool> {
        observe("exists", key, self.store.exists(key).await)
    }

    /// Deletes one or more keys and returns how many existed.
    ///
    /// A single key goes through a single-key delete; several keys are
    /// batched into one command. An empty slice is a no-op.
    pub async fn delete(&self, keys: &[impl AsRef<str>]) -> StoreResult<u64> {
        match keys {
            [] => Ok(0),
            [key] => {
                let key = key.as_ref();
                let existed = observe("del", key, self.store.delete(key).await)?;
                Ok(u64::from(existed))
            }
            many => {
                let keys = super::owned(many);
                let deleted = observe("del", &keys.join(","), self.store.delete_many(&keys).await)?;
                debug!("Deleted {}/{} keys", deleted, keys.len());
                Ok(deleted)
            }
        }
    }

    /// Lists keys matching a glob-style pattern.
    pub async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        observe("keys", pattern, self.store.keys(pattern).await)
    }

    /// Checks that the store answers.
    pub async fn ping(&self) -> StoreResult<()> {
        observe("ping", "", self.store.ping().await)
    }
}
