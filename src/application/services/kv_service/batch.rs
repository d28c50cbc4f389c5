//! Multi-key reads and writes.

use super::{KvService, observe, owned};
use crate::error::StoreResult;
use std::collections::HashMap;

impl KvService {
    /// Issues one `GET` per key in a single pipelined round trip and returns
    /// the raw replies in key order, `None` for missing keys.
    ///
    /// The pipeline is not a transaction: other clients may interleave.
    pub async fn pipelined_get(&self, keys: &[impl AsRef<str>]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let keys = owned(keys);
        observe(
            "pipeline",
            &keys.join(","),
            self.store.pipelined_get(&keys).await,
        )
    }

    /// Reads several keys with one `MGET`; values come back in key order.
    pub async fn multi_get(&self, keys: &[impl AsRef<str>]) -> StoreResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let keys = owned(keys);
        observe("mget", &keys.join(","), self.store.mget(&keys).await)
    }

    /// Writes every entry of `map` with one `MSET`.
    pub async fn multi_set(&self, map: &HashMap<String, String>) -> StoreResult<()> {
        if map.is_empty() {
            return Ok(());
        }
        let entries: Vec<(String, String)> =
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let label = entries
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(",");
        observe("mset", &label, self.store.mset(&entries).await)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::service;
    use crate::domain::store::MockKeyValueStore;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_empty_batches_skip_store() {
        let kv = service(MockKeyValueStore::new());
        let none: [&str; 0] = [];

        assert!(kv.pipelined_get(&none).await.unwrap().is_empty());
        assert!(kv.multi_get(&none).await.unwrap().is_empty());
        kv.multi_set(&HashMap::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_pipelined_get_returns_raw_replies() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_pipelined_get()
            .withf(|keys| keys == ["a".to_string(), "b".to_string()])
            .times(1)
            .returning(|_| Ok(vec![Some(b"1".to_vec()), None]));

        let kv = service(mock);
        let replies = kv.pipelined_get(&["a", "b"]).await.unwrap();
        assert_eq!(replies, vec![Some(b"1".to_vec()), None]);
    }

    #[tokio::test]
    async fn test_multi_set_copies_entries() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_mset()
            .withf(|entries| entries.len() == 2)
            .times(1)
            .returning(|_| Ok(()));

        let map = HashMap::from([
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]);

        let kv = service(mock);
        kv.multi_set(&map).await.unwrap();
    }
}
