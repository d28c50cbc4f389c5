//! Cursor-driven scans over hash fields and sorted-set members.
//!
//! Each call returns a fresh lazy stream. Pages are fetched from the store
//! one at a time as the consumer pulls, starting from cursor `0` and ending
//! when the store hands back cursor `0` again; nothing beyond the current
//! page is buffered.

use super::{KvService, observe};
use crate::domain::entities::{ScanOptions, ScanPage, ScoredMember};
use crate::error::{StoreError, StoreResult};
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;

/// Lazy sequence of scanned entries. The first failed page ends the stream
/// with its error.
pub type ScanStream<T> = BoxStream<'static, StoreResult<T>>;

impl KvService {
    /// Scans the fields of a hash, yielding `(field, value)` pairs.
    pub fn h_scan(&self, key: &str, options: ScanOptions) -> ScanStream<(String, String)> {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        scan_stream(move |cursor| {
            let store = Arc::clone(&store);
            let key = key.clone();
            let options = options.clone();
            async move {
                let page = store
                    .hscan(&key, cursor, &options.pattern, options.count)
                    .await;
                observe("hscan", &key, page)
            }
        })
    }

    /// Scans the members of a sorted set, yielding members with their scores.
    pub fn z_scan(&self, key: &str, options: ScanOptions) -> ScanStream<ScoredMember> {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        scan_stream(move |cursor| {
            let store = Arc::clone(&store);
            let key = key.clone();
            let options = options.clone();
            async move {
                let page = store
                    .zscan(&key, cursor, &options.pattern, options.count)
                    .await;
                observe("zscan", &key, page)
            }
        })
    }
}

/// Turns a page fetcher into a flat stream of items.
fn scan_stream<T, F, Fut>(fetch: F) -> ScanStream<T>
where
    T: Send + 'static,
    F: Fn(u64) -> Fut + Send + 'static,
    Fut: Future<Output = StoreResult<ScanPage<T>>> + Send + 'static,
{
    stream::try_unfold((Some(0u64), fetch), |(cursor, fetch)| async move {
        let Some(cursor) = cursor else {
            return Ok::<_, StoreError>(None);
        };
        let page = fetch(cursor).await?;
        let next = (!page.is_last()).then_some(page.cursor);
        Ok(Some((page.items, (next, fetch))))
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, StoreError>)))
    .try_flatten()
    .boxed()
}
