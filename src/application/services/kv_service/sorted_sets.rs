//! Sorted-set operations.

use super::{KvService, observe, owned};
use crate::domain::entities::{RangeOrder, ScoredMember};
use crate::error::StoreResult;
use tracing::debug;

impl KvService {
    /// Adds members with their scores; existing members get their score
    /// updated. Returns how many members were new.
    pub async fn z_add(&self, key: &str, members: &[ScoredMember]) -> StoreResult<u64> {
        let members = members.to_vec();
        observe("zadd", key, self.store.zadd(key, &members).await)
    }

    /// Adds a single member. Returns `true` if it was new.
    pub async fn z_add_one(&self, key: &str, member: &str, score: f64) -> StoreResult<bool> {
        let added = self.z_add(key, &[ScoredMember::new(member, score)]).await?;
        Ok(added > 0)
    }

    pub async fn z_card(&self, key: &str) -> StoreResult<u64> {
        observe("zcard", key, self.store.zcard(key).await)
    }

    /// Adds `delta` to the member's score and returns the new score.
    pub async fn z_incr(&self, key: &str, member: &str, delta: f64) -> StoreResult<f64> {
        observe("zincrby", key, self.store.zincr_by(key, member, delta).await)
    }

    /// Integer flavour of [`Self::z_incr`].
    pub async fn z_incr_by(&self, key: &str, member: &str, delta: i64) -> StoreResult<f64> {
        self.z_incr(key, member, delta as f64).await
    }

    /// Removes members and returns how many were present.
    pub async fn z_remove(&self, key: &str, members: &[impl AsRef<str>]) -> StoreResult<u64> {
        let members = owned(members);
        observe("zrem", key, self.store.zrem(key, &members).await)
    }

    /// Members ranked `start..=stop`, lowest score first.
    pub async fn z_range(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        observe(
            "zrange",
            key,
            self.store
                .zrange(key, start, stop, RangeOrder::Ascending)
                .await,
        )
    }

    /// Members ranked `start..=stop`, highest score first.
    pub async fn z_reverse_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<String>> {
        observe(
            "zrevrange",
            key,
            self.store
                .zrange(key, start, stop, RangeOrder::Descending)
                .await,
        )
    }

    pub async fn z_range_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<ScoredMember>> {
        observe(
            "zrange",
            key,
            self.store
                .zrange_with_scores(key, start, stop, RangeOrder::Ascending)
                .await,
        )
    }

    pub async fn z_reverse_range_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<ScoredMember>> {
        observe(
            "zrevrange",
            key,
            self.store
                .zrange_with_scores(key, start, stop, RangeOrder::Descending)
                .await,
        )
    }

    /// Members with `min <= score <= max`, lowest score first, with scores.
    pub async fn z_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<ScoredMember>> {
        observe(
            "zrangebyscore",
            key,
            self.store
                .zrange_by_score(key, min, max, RangeOrder::Ascending)
                .await,
        )
    }

    /// Like [`Self::z_range_by_score`] without the scores.
    pub async fn z_range_by_score_members(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<String>> {
        let members = self.z_range_by_score(key, min, max).await?;
        Ok(members.into_iter().map(|m| m.member).collect())
    }

    /// Members with `min <= score <= max`, highest score first, with scores.
    pub async fn z_reverse_range_by_score_with_scores(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<ScoredMember>> {
        observe(
            "zrevrangebyscore",
            key,
            self.store
                .zrange_by_score(key, min, max, RangeOrder::Descending)
                .await,
        )
    }

    /// Zero-based rank by ascending score, `None` if not a member.
    pub async fn z_rank(&self, key: &str, member: &str) -> StoreResult<Option<u64>> {
        observe(
            "zrank",
            key,
            self.store.zrank(key, member, RangeOrder::Ascending).await,
        )
    }

    /// Zero-based rank by descending score, `None` if not a member.
    pub async fn z_reverse_rank(&self, key: &str, member: &str) -> StoreResult<Option<u64>> {
        observe(
            "zrevrank",
            key,
            self.store.zrank(key, member, RangeOrder::Descending).await,
        )
    }

    pub async fn z_score(&self, key: &str, member: &str) -> StoreResult<Option<f64>> {
        observe("zscore", key, self.store.zscore(key, member).await)
    }

    /// Counts members with `min <= score <= max`.
    pub async fn z_count(&self, key: &str, min: f64, max: f64) -> StoreResult<u64> {
        observe("zcount", key, self.store.zcount(key, min, max).await)
    }

    /// Removes members with `start <= score <= end` and returns how many went.
    ///
    /// An inverted range (`end < start`) removes nothing and skips the store.
    pub async fn z_rem_range_by_score(&self, key: &str, start: f64, end: f64) -> StoreResult<u64> {
        if end < start {
            debug!("Skipping ZREMRANGEBYSCORE on {}: {} < {}", key, end, start);
            return Ok(0);
        }
        observe(
            "zremrangebyscore",
            key,
            self.store.zrem_range_by_score(key, start, end).await,
        )
    }
}
