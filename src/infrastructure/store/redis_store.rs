//! Redis-backed store implementation.

use super::error::map_redis_error;
use crate::config::mask_connection_string;
use crate::domain::entities::{RangeOrder, ScanPage, ScoredMember, SetCondition};
use crate::domain::store::KeyValueStore;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Cmd, FromRedisValue, aio::ConnectionManager};
use std::collections::HashMap;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

/// Redis store for the key-value facade.
///
/// Holds a single `ConnectionManager`: a multiplexed connection that
/// reconnects on its own. Every call works on a cheap clone of it, so the
/// store is safe to share across tasks behind an `Arc`.
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::Connection(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        Ok(Self { manager })
    }

    /// Connects with exponential backoff, making at most `attempts` tries.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn connect_with_retry(redis_url: &str, attempts: usize) -> StoreResult<Self> {
        info!("Connecting to Redis at {}", mask_connection_string(redis_url));

        let strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(attempts.saturating_sub(1));

        let mut attempt = 0usize;
        let store = Retry::spawn(strategy, || {
            attempt += 1;
            let current = attempt;
            async move {
                Self::connect(redis_url).await.inspect_err(|e| {
                    warn!("Redis connection attempt {}/{} failed: {}", current, attempts, e)
                })
            }
        })
        .await?;

        info!("✓ Connected to Redis");
        Ok(store)
    }

    async fn query<T: FromRedisValue + Send>(&self, cmd: Cmd) -> StoreResult<T> {
        let mut conn = self.manager.clone();
        cmd.query_async(&mut conn).await.map_err(map_redis_error)
    }
}

/// Splits a flat `[a, b, a, b, ...]` reply into pairs.
fn into_pairs(flat: Vec<String>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(first), Some(second)) = (iter.next(), iter.next()) {
        pairs.push((first, second));
    }
    pairs
}

/// Parses a flat `[member, score, ...]` reply.
fn into_scored_members(flat: Vec<String>) -> StoreResult<Vec<ScoredMember>> {
    into_pairs(flat)
        .into_iter()
        .map(|(member, score)| {
            let score = score.parse::<f64>().map_err(|_| {
                StoreError::operation(format!("Invalid score '{}' for '{}'", score, member))
            })?;
            Ok(ScoredMember { member, score })
        })
        .collect()
}

fn scan_cmd(name: &str, key: &str, cursor: u64, pattern: &str, count: u64) -> Cmd {
    let mut cmd = redis::cmd(name);
    cmd.arg(key)
        .arg(cursor)
        .arg("MATCH")
        .arg(pattern)
        .arg("COUNT")
        .arg(count);
    cmd
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn expire(&self, key: &str, seconds: u64) -> StoreResult<bool> {
        self.query(redis::cmd("EXPIRE").arg(key).arg(seconds).clone())
            .await
    }

    async fn ttl(&self, key: &str) -> StoreResult<i64> {
        self.query(redis::cmd("TTL").arg(key).clone()).await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.query(redis::cmd("EXISTS").arg(key).clone()).await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.manager.clone();
        let deleted: u64 = conn.del(key).await.map_err(map_redis_error)?;
        if deleted > 0 {
            debug!("Redis DEL: {}", key);
        }
        Ok(deleted > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.query(redis::cmd("DEL").arg(keys).clone()).await
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        self.query(redis::cmd("KEYS").arg(pattern).clone()).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        conn.ping::<()>().await.map_err(map_redis_error)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(map_redis_error)
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        condition: SetCondition,
        ttl_seconds: Option<u64>,
    ) -> StoreResult<bool> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl_seconds {
            cmd.arg("EX").arg(ttl);
        }
        match condition {
            SetCondition::Always => {}
            SetCondition::IfAbsent => {
                cmd.arg("NX");
            }
            SetCondition::IfPresent => {
                cmd.arg("XX");
            }
        }

        // OK on write, nil when the NX/XX condition failed.
        let reply: Option<String> = self.query(cmd).await?;
        Ok(reply.is_some())
    }

    async fn get_set(&self, key: &str, value: &str) -> StoreResult<Option<String>> {
        self.query(redis::cmd("GETSET").arg(key).arg(value).clone())
            .await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.query(redis::cmd("INCRBY").arg(key).arg(delta).clone())
            .await
    }

    async fn mget(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.query(redis::cmd("MGET").arg(keys).clone()).await
    }

    async fn mset(&self, entries: &[(String, String)]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("MSET");
        for (key, value) in entries {
            cmd.arg(key).arg(value);
        }
        self.query(cmd).await
    }

    async fn pipelined_get(&self, keys: &[String]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("GET").arg(key);
        }

        let mut conn = self.manager.clone();
        let replies: Vec<Option<Vec<u8>>> =
            pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        debug!("Redis pipelined GET: {} keys", keys.len());
        Ok(replies)
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.query(redis::cmd("HGET").arg(key).arg(field).clone())
            .await
    }

    async fn hget_all(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        let entries: HashMap<String, String> =
            self.query(redis::cmd("HGETALL").arg(key).clone()).await?;
        Ok(entries.into_iter().collect())
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        self.query(redis::cmd("HMGET").arg(key).arg(fields).clone())
            .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        let added: u64 = self
            .query(redis::cmd("HSET").arg(key).arg(field).arg(value).clone())
            .await?;
        Ok(added > 0)
    }

    async fn hset_many(&self, key: &str, entries: &[(String, String)]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in entries {
            cmd.arg(field).arg(value);
        }
        let _added: u64 = self.query(cmd).await?;
        Ok(())
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> StoreResult<u64> {
        if fields.is_empty() {
            return Ok(0);
        }
        self.query(redis::cmd("HDEL").arg(key).arg(fields).clone())
            .await
    }

    async fn hexists(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.query(redis::cmd("HEXISTS").arg(key).arg(field).clone())
            .await
    }

    async fn hincr_by_float(&self, key: &str, field: &str, delta: f64) -> StoreResult<f64> {
        self.query(
            redis::cmd("HINCRBYFLOAT")
                .arg(key)
                .arg(field)
                .arg(delta)
                .clone(),
        )
        .await
    }

    async fn hscan(
        &self,
        key: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage<(String, String)>> {
        let (next, flat): (u64, Vec<String>) = self
            .query(scan_cmd("HSCAN", key, cursor, pattern, count))
            .await?;
        Ok(ScanPage::new(next, into_pairs(flat)))
    }

    async fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        self.query(redis::cmd("SMEMBERS").arg(key).clone()).await
    }

    async fn srandmember(&self, key: &str) -> StoreResult<Option<String>> {
        self.query(redis::cmd("SRANDMEMBER").arg(key).clone()).await
    }

    async fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.query(redis::cmd("SISMEMBER").arg(key).arg(member).clone())
            .await
    }

    async fn sadd(&self, key: &str, members: &[String]) -> StoreResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        self.query(redis::cmd("SADD").arg(key).arg(members).clone())
            .await
    }

    async fn scard(&self, key: &str) -> StoreResult<u64> {
        self.query(redis::cmd("SCARD").arg(key).clone()).await
    }

    async fn srem(&self, key: &str, members: &[String]) -> StoreResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        self.query(redis::cmd("SREM").arg(key).arg(members).clone())
            .await
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        self.query(redis::cmd("LRANGE").arg(key).arg(start).arg(stop).clone())
            .await
    }

    async fn llen(&self, key: &str) -> StoreResult<u64> {
        self.query(redis::cmd("LLEN").arg(key).clone()).await
    }

    async fn lindex(&self, key: &str, index: i64) -> StoreResult<Option<String>> {
        self.query(redis::cmd("LINDEX").arg(key).arg(index).clone())
            .await
    }

    async fn lset(&self, key: &str, index: i64, value: &str) -> StoreResult<()> {
        self.query(redis::cmd("LSET").arg(key).arg(index).arg(value).clone())
            .await
    }

    async fn rpush(&self, key: &str, values: &[String]) -> StoreResult<u64> {
        if values.is_empty() {
            return self.llen(key).await;
        }
        self.query(redis::cmd("RPUSH").arg(key).arg(values).clone())
            .await
    }

    async fn lpush(&self, key: &str, values: &[String]) -> StoreResult<u64> {
        if values.is_empty() {
            return self.llen(key).await;
        }
        self.query(redis::cmd("LPUSH").arg(key).arg(values).clone())
            .await
    }

    async fn rpop(&self, key: &str) -> StoreResult<Option<String>> {
        self.query(redis::cmd("RPOP").arg(key).clone()).await
    }

    async fn lpop(&self, key: &str) -> StoreResult<Option<String>> {
        self.query(redis::cmd("LPOP").arg(key).clone()).await
    }

    async fn lrem(&self, key: &str, count: i64, value: &str) -> StoreResult<u64> {
        self.query(redis::cmd("LREM").arg(key).arg(count).arg(value).clone())
            .await
    }

    async fn zadd(&self, key: &str, members: &[ScoredMember]) -> StoreResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("ZADD");
        cmd.arg(key);
        for m in members {
            cmd.arg(m.score).arg(&m.member);
        }
        self.query(cmd).await
    }

    async fn zcard(&self, key: &str) -> StoreResult<u64> {
        self.query(redis::cmd("ZCARD").arg(key).clone()).await
    }

    async fn zincr_by(&self, key: &str, member: &str, delta: f64) -> StoreResult<f64> {
        self.query(redis::cmd("ZINCRBY").arg(key).arg(delta).arg(member).clone())
            .await
    }

    async fn zrem(&self, key: &str, members: &[String]) -> StoreResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        self.query(redis::cmd("ZREM").arg(key).arg(members).clone())
            .await
    }

    async fn zrange(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: RangeOrder,
    ) -> StoreResult<Vec<String>> {
        let name = match order {
            RangeOrder::Ascending => "ZRANGE",
            RangeOrder::Descending => "ZREVRANGE",
        };
        self.query(redis::cmd(name).arg(key).arg(start).arg(stop).clone())
            .await
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: RangeOrder,
    ) -> StoreResult<Vec<ScoredMember>> {
        let name = match order {
            RangeOrder::Ascending => "ZRANGE",
            RangeOrder::Descending => "ZREVRANGE",
        };
        let flat: Vec<String> = self
            .query(
                redis::cmd(name)
                    .arg(key)
                    .arg(start)
                    .arg(stop)
                    .arg("WITHSCORES")
                    .clone(),
            )
            .await?;
        into_scored_members(flat)
    }

    async fn zrange_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        order: RangeOrder,
    ) -> StoreResult<Vec<ScoredMember>> {
        // ZREVRANGEBYSCORE takes its bounds as max, min.
        let mut cmd = match order {
            RangeOrder::Ascending => {
                let mut cmd = redis::cmd("ZRANGEBYSCORE");
                cmd.arg(key).arg(min).arg(max);
                cmd
            }
            RangeOrder::Descending => {
                let mut cmd = redis::cmd("ZREVRANGEBYSCORE");
                cmd.arg(key).arg(max).arg(min);
                cmd
            }
        };
        cmd.arg("WITHSCORES");

        let flat: Vec<String> = self.query(cmd).await?;
        into_scored_members(flat)
    }

    async fn zrank(&self, key: &str, member: &str, order: RangeOrder) -> StoreResult<Option<u64>> {
        let name = match order {
            RangeOrder::Ascending => "ZRANK",
            RangeOrder::Descending => "ZREVRANK",
        };
        self.query(redis::cmd(name).arg(key).arg(member).clone())
            .await
    }

    async fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<f64>> {
        self.query(redis::cmd("ZSCORE").arg(key).arg(member).clone())
            .await
    }

    async fn zcount(&self, key: &str, min: f64, max: f64) -> StoreResult<u64> {
        self.query(redis::cmd("ZCOUNT").arg(key).arg(min).arg(max).clone())
            .await
    }

    async fn zrem_range_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<u64> {
        self.query(
            redis::cmd("ZREMRANGEBYSCORE")
                .arg(key)
                .arg(min)
                .arg(max)
                .clone(),
        )
        .await
    }

    async fn zscan(
        &self,
        key: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage<ScoredMember>> {
        let (next, flat): (u64, Vec<String>) = self
            .query(scan_cmd("ZSCAN", key, cursor, pattern, count))
            .await?;
        Ok(ScanPage::new(next, into_scored_members(flat)?))
    }

    async fn publish(&self, channel: &str, message: &str) -> StoreResult<u64> {
        let mut conn = self.manager.clone();
        conn.publish::<_, _, u64>(channel, message)
            .await
            .map_err(map_redis_error)
    }
}
