//! Publish passthrough. Subscriptions are managed by the store's own clients.

use super::{KvService, observe};
use crate::error::StoreResult;

impl KvService {
    /// Publishes `message` on `channel` and returns how many subscribers got it.
    pub async fn publish(&self, channel: &str, message: &str) -> StoreResult<u64> {
        observe("publish", channel, self.store.publish(channel, message).await)
    }
}
