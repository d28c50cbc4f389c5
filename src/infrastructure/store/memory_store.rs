//! In-process store implementation.

use crate::domain::entities::{RangeOrder, ScanPage, ScoredMember, SetCondition};
use crate::domain::store::KeyValueStore;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use rand::seq::IteratorRandom;
use regex::Regex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, RwLockWriteGuard, broadcast};
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

/// Every this many writes, expired entries are swept from the whole keyspace.
const SWEEP_EVERY: u64 = 256;

enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
    List(VecDeque<String>),
    ZSet(HashMap<String, f64>),
}

impl Value {
    fn is_empty(&self) -> bool {
        match self {
            Value::Str(_) => false,
            Value::Hash(h) => h.is_empty(),
            Value::Set(s) => s.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::ZSet(z) => z.is_empty(),
        }
    }

    fn as_str(&self) -> Option<&String> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn as_str_mut(&mut self) -> Option<&mut String> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn as_hash(&self) -> Option<&HashMap<String, String>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    fn as_hash_mut(&mut self) -> Option<&mut HashMap<String, String>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    fn as_set(&self) -> Option<&HashSet<String>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    fn as_set_mut(&mut self) -> Option<&mut HashSet<String>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&VecDeque<String>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    fn as_list_mut(&mut self) -> Option<&mut VecDeque<String>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    fn as_zset(&self) -> Option<&HashMap<String, f64>> {
        match self {
            Value::ZSet(z) => Some(z),
            _ => None,
        }
    }

    fn as_zset_mut(&mut self) -> Option<&mut HashMap<String, f64>> {
        match self {
            Value::ZSet(z) => Some(z),
            _ => None,
        }
    }
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Instant::now() >= e)
    }

    /// Remaining TTL in the store's reply convention, rounded to the nearest second.
    fn ttl_reply(&self) -> i64 {
        match self.expires_at {
            None => -1,
            Some(at) => {
                let remaining = at.saturating_duration_since(Instant::now());
                ((remaining.as_millis() + 500) / 1000) as i64
            }
        }
    }
}

type Keyspace = HashMap<String, Entry>;

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
        key
    ))
}

fn live<'a>(map: &'a Keyspace, key: &str) -> Option<&'a Entry> {
    map.get(key).filter(|e| !e.is_expired())
}

fn purge_if_expired(map: &mut Keyspace, key: &str) {
    if map.get(key).is_some_and(Entry::is_expired) {
        map.remove(key);
    }
}

/// Drops every expired entry and returns how many went.
fn sweep_expired(map: &mut Keyspace) -> usize {
    let before = map.len();
    map.retain(|_, e| !e.is_expired());
    before - map.len()
}

/// Absolute expiry for a TTL, rejecting TTLs the clock cannot represent.
fn deadline(seconds: u64) -> StoreResult<Instant> {
    Instant::now()
        .checked_add(Duration::from_secs(seconds))
        .ok_or_else(|| StoreError::operation("ERR invalid expire time"))
}

/// Borrows the value at `key` as `T`, `None` when absent.
fn read<'a, T>(
    map: &'a Keyspace,
    key: &str,
    pick: fn(&Value) -> Option<&T>,
) -> StoreResult<Option<&'a T>> {
    match live(map, key) {
        None => Ok(None),
        Some(entry) => pick(&entry.value).map(Some).ok_or_else(|| wrong_type(key)),
    }
}

/// Mutably borrows an existing value at `key` as `T`.
fn modify<'a, T>(
    map: &'a mut Keyspace,
    key: &str,
    pick: fn(&mut Value) -> Option<&mut T>,
) -> StoreResult<Option<&'a mut T>> {
    purge_if_expired(map, key);
    match map.get_mut(key) {
        None => Ok(None),
        Some(entry) => pick(&mut entry.value)
            .map(Some)
            .ok_or_else(|| wrong_type(key)),
    }
}

/// Mutably borrows the value at `key` as `T`, creating it when absent.
fn upsert<'a, T>(
    map: &'a mut Keyspace,
    key: &str,
    create: fn() -> Value,
    pick: fn(&mut Value) -> Option<&mut T>,
) -> StoreResult<&'a mut T> {
    purge_if_expired(map, key);
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Entry::new(create()));
    pick(&mut entry.value).ok_or_else(|| wrong_type(key))
}

/// Aggregates are removed once their last element goes.
fn remove_if_empty(map: &mut Keyspace, key: &str) {
    if map.get(key).is_some_and(|e| e.value.is_empty()) {
        map.remove(key);
    }
}

fn new_hash() -> Value {
    Value::Hash(HashMap::new())
}

fn new_set() -> Value {
    Value::Set(HashSet::new())
}

fn new_list() -> Value {
    Value::List(VecDeque::new())
}

fn new_zset() -> Value {
    Value::ZSet(HashMap::new())
}

/// Translates a glob-style pattern (`*`, `?`, `[...]`, `\x`) into an anchored regex.
fn compile_glob(pattern: &str) -> StoreResult<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                re.push('[');
                let mut first = true;
                for c in chars.by_ref() {
                    match c {
                        ']' => break,
                        '^' if first => re.push('^'),
                        '\\' | '[' | '&' | '~' => {
                            re.push('\\');
                            re.push(c);
                        }
                        _ => re.push(c),
                    }
                    first = false;
                }
                re.push(']');
            }
            '\\' => {
                if let Some(next) = chars.next() {
                    re.push_str(&regex::escape(&next.to_string()));
                }
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }

    re.push('$');
    Regex::new(&re)
        .map_err(|e| StoreError::operation(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// Resolves an inclusive `[start, stop]` range over `len` elements.
fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let idx = if index < 0 { len as i64 + index } else { index };
    (0..len as i64).contains(&idx).then_some(idx as usize)
}

fn sorted_members(zset: &HashMap<String, f64>, order: RangeOrder) -> Vec<ScoredMember> {
    let mut members: Vec<ScoredMember> = zset
        .iter()
        .map(|(m, s)| ScoredMember::new(m.clone(), *s))
        .collect();
    members.sort_by(ScoredMember::cmp_by_score);
    if order == RangeOrder::Descending {
        members.reverse();
    }
    members
}

fn page<T>(items: Vec<T>, cursor: u64, count: u64) -> ScanPage<T> {
    let offset = cursor as usize;
    let end = offset.saturating_add(count as usize).min(items.len());
    let next = if end >= items.len() { 0 } else { end as u64 };
    let items = items
        .into_iter()
        .skip(offset)
        .take(end.saturating_sub(offset))
        .collect();
    ScanPage::new(next, items)
}

/// In-process implementation of [`KeyValueStore`].
///
/// Follows the store's command semantics closely enough to stand in for
/// Redis: typed values, empty aggregates removed, `WRONGTYPE` errors, glob
/// patterns and local pub/sub channels.
///
/// Expired keys are hidden from reads as soon as their TTL elapses. They are
/// freed when a write touches them, on `KEYS`, and by a full sweep every
/// `SWEEP_EVERY` writes.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Fallback when the Redis connection fails at startup
/// - Deterministic backend for tests
pub struct MemoryStore {
    keyspace: RwLock<Keyspace>,
    channels: RwLock<HashMap<String, broadcast::Sender<String>>>,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using MemoryStore (in-process keyspace)");
        Self {
            keyspace: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// Takes the keyspace write lock, sweeping expired entries periodically.
    async fn write(&self) -> RwLockWriteGuard<'_, Keyspace> {
        let mut map = self.keyspace.write().await;
        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            let swept = sweep_expired(&mut map);
            if swept > 0 {
                debug!("Swept {} expired keys", swept);
            }
        }
        map
    }

    /// Subscribes to messages published on `channel`.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn expire(&self, key: &str, seconds: u64) -> StoreResult<bool> {
        let mut map = self.write().await;
        purge_if_expired(&mut map, key);
        if !map.contains_key(key) {
            return Ok(false);
        }
        // A zero TTL deletes the key right away.
        if seconds == 0 {
            map.remove(key);
            return Ok(true);
        }
        let at = deadline(seconds)?;
        if let Some(entry) = map.get_mut(key) {
            entry.expires_at = Some(at);
        }
        Ok(true)
    }

    async fn ttl(&self, key: &str) -> StoreResult<i64> {
        let map = self.keyspace.read().await;
        Ok(live(&map, key).map_or(-2, Entry::ttl_reply))
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let map = self.keyspace.read().await;
        Ok(live(&map, key).is_some())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.write().await;
        purge_if_expired(&mut map, key);
        Ok(map.remove(key).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        let mut map = self.write().await;
        let mut deleted = 0;
        for key in keys {
            purge_if_expired(&mut map, key);
            if map.remove(key).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let matcher = compile_glob(pattern)?;
        let mut map = self.keyspace.write().await;
        sweep_expired(&mut map);
        let mut keys: Vec<String> = map
            .keys()
            .filter(|k| matcher.is_match(k))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_str)?.cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        condition: SetCondition,
        ttl_seconds: Option<u64>,
    ) -> StoreResult<bool> {
        let expires_at = ttl_seconds.map(deadline).transpose()?;
        let mut map = self.write().await;
        purge_if_expired(&mut map, key);

        let present = map.contains_key(key);
        let allowed = match condition {
            SetCondition::Always => true,
            SetCondition::IfAbsent => !present,
            SetCondition::IfPresent => present,
        };
        if !allowed {
            return Ok(false);
        }

        let mut entry = Entry::new(Value::Str(value.to_string()));
        entry.expires_at = expires_at;
        map.insert(key.to_string(), entry);
        Ok(true)
    }

    async fn get_set(&self, key: &str, value: &str) -> StoreResult<Option<String>> {
        let mut map = self.write().await;
        let previous = read(&map, key, Value::as_str)?.cloned();
        map.insert(key.to_string(), Entry::new(Value::Str(value.to_string())));
        Ok(previous)
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut map = self.write().await;
        let current = upsert(&mut map, key, || Value::Str("0".to_string()), Value::as_str_mut)?;

        let next = current
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_add(delta))
            .ok_or_else(|| StoreError::operation("ERR value is not an integer or out of range"))?;

        *current = next.to_string();
        Ok(next)
    }

    async fn mget(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        let map = self.keyspace.read().await;
        // MGET reports keys of another type as missing rather than failing.
        Ok(keys
            .iter()
            .map(|k| live(&map, k).and_then(|e| e.value.as_str()).cloned())
            .collect())
    }

    async fn mset(&self, entries: &[(String, String)]) -> StoreResult<()> {
        let mut map = self.write().await;
        for (key, value) in entries {
            map.insert(key.clone(), Entry::new(Value::Str(value.clone())));
        }
        Ok(())
    }

    async fn pipelined_get(&self, keys: &[String]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        let map = self.keyspace.read().await;
        keys.iter()
            .map(|k| Ok(read(&map, k, Value::as_str)?.map(|v| v.clone().into_bytes())))
            .collect()
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_hash)?.and_then(|h| h.get(field).cloned()))
    }

    async fn hget_all(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_hash)?
            .map(|h| h.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>> {
        let map = self.keyspace.read().await;
        let hash = read(&map, key, Value::as_hash)?;
        Ok(fields
            .iter()
            .map(|f| hash.and_then(|h| h.get(f).cloned()))
            .collect())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        let mut map = self.write().await;
        let hash = upsert(&mut map, key, new_hash, Value::as_hash_mut)?;
        Ok(hash.insert(field.to_string(), value.to_string()).is_none())
    }

    async fn hset_many(&self, key: &str, entries: &[(String, String)]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut map = self.write().await;
        let hash = upsert(&mut map, key, new_hash, Value::as_hash_mut)?;
        hash.extend(entries.iter().cloned());
        Ok(())
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> StoreResult<u64> {
        let mut map = self.write().await;
        let Some(hash) = modify(&mut map, key, Value::as_hash_mut)? else {
            return Ok(0);
        };
        let removed = fields.iter().filter(|f| hash.remove(*f).is_some()).count();
        remove_if_empty(&mut map, key);
        Ok(removed as u64)
    }

    async fn hexists(&self, key: &str, field: &str) -> StoreResult<bool> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_hash)?.is_some_and(|h| h.contains_key(field)))
    }

    async fn hincr_by_float(&self, key: &str, field: &str, delta: f64) -> StoreResult<f64> {
        let mut map = self.write().await;
        let hash = upsert(&mut map, key, new_hash, Value::as_hash_mut)?;

        let current = match hash.get(field) {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| StoreError::operation("ERR hash value is not a float"))?,
            None => 0.0,
        };
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn hscan(
        &self,
        key: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage<(String, String)>> {
        let matcher = compile_glob(pattern)?;
        let map = self.keyspace.read().await;

        let mut entries: Vec<(String, String)> = read(&map, key, Value::as_hash)?
            .map(|h| {
                h.iter()
                    .filter(|(f, _)| matcher.is_match(f))
                    .map(|(f, v)| (f.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort();

        Ok(page(entries, cursor, count))
    }

    async fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_set)?
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn srandmember(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_set)?.and_then(|s| s.iter().choose(&mut rand::rng()).cloned()))
    }

    async fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_set)?.is_some_and(|s| s.contains(member)))
    }

    async fn sadd(&self, key: &str, members: &[String]) -> StoreResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut map = self.write().await;
        let set = upsert(&mut map, key, new_set, Value::as_set_mut)?;
        let added = members.iter().filter(|m| set.insert((*m).clone())).count();
        Ok(added as u64)
    }

    async fn scard(&self, key: &str) -> StoreResult<u64> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_set)?.map_or(0, |s| s.len() as u64))
    }

    async fn srem(&self, key: &str, members: &[String]) -> StoreResult<u64> {
        let mut map = self.write().await;
        let Some(set) = modify(&mut map, key, Value::as_set_mut)? else {
            return Ok(0);
        };
        let removed = members.iter().filter(|m| set.remove(*m)).count();
        remove_if_empty(&mut map, key);
        Ok(removed as u64)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        let map = self.keyspace.read().await;
        let Some(list) = read(&map, key, Value::as_list)? else {
            return Ok(Vec::new());
        };
        Ok(match normalize_range(start, stop, list.len()) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn llen(&self, key: &str) -> StoreResult<u64> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_list)?.map_or(0, |l| l.len() as u64))
    }

    async fn lindex(&self, key: &str, index: i64) -> StoreResult<Option<String>> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_list)?
            .and_then(|l| normalize_index(index, l.len()).and_then(|i| l.get(i).cloned())))
    }

    async fn lset(&self, key: &str, index: i64, value: &str) -> StoreResult<()> {
        let mut map = self.write().await;
        let list = modify(&mut map, key, Value::as_list_mut)?
            .ok_or_else(|| StoreError::operation("ERR no such key"))?;
        let idx = normalize_index(index, list.len())
            .ok_or_else(|| StoreError::operation("ERR index out of range"))?;
        list[idx] = value.to_string();
        Ok(())
    }

    async fn rpush(&self, key: &str, values: &[String]) -> StoreResult<u64> {
        let mut map = self.write().await;
        if values.is_empty() {
            return Ok(read(&map, key, Value::as_list)?.map_or(0, |l| l.len() as u64));
        }
        let list = upsert(&mut map, key, new_list, Value::as_list_mut)?;
        list.extend(values.iter().cloned());
        Ok(list.len() as u64)
    }

    async fn lpush(&self, key: &str, values: &[String]) -> StoreResult<u64> {
        let mut map = self.write().await;
        if values.is_empty() {
            return Ok(read(&map, key, Value::as_list)?.map_or(0, |l| l.len() as u64));
        }
        let list = upsert(&mut map, key, new_list, Value::as_list_mut)?;
        for value in values {
            list.push_front(value.clone());
        }
        Ok(list.len() as u64)
    }

    async fn rpop(&self, key: &str) -> StoreResult<Option<String>> {
        let mut map = self.write().await;
        let popped = modify(&mut map, key, Value::as_list_mut)?.and_then(VecDeque::pop_back);
        remove_if_empty(&mut map, key);
        Ok(popped)
    }

    async fn lpop(&self, key: &str) -> StoreResult<Option<String>> {
        let mut map = self.write().await;
        let popped = modify(&mut map, key, Value::as_list_mut)?.and_then(VecDeque::pop_front);
        remove_if_empty(&mut map, key);
        Ok(popped)
    }

    async fn lrem(&self, key: &str, count: i64, value: &str) -> StoreResult<u64> {
        let mut map = self.write().await;
        let Some(list) = modify(&mut map, key, Value::as_list_mut)? else {
            return Ok(0);
        };

        let limit = if count == 0 {
            usize::MAX
        } else {
            count.unsigned_abs() as usize
        };

        let mut positions: Vec<usize> = list
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_str() == value)
            .map(|(i, _)| i)
            .collect();
        if count < 0 {
            positions.reverse();
        }
        positions.truncate(limit);
        // Remove back to front so earlier positions stay valid.
        positions.sort_unstable_by(|a, b| b.cmp(a));
        for i in &positions {
            list.remove(*i);
        }

        remove_if_empty(&mut map, key);
        Ok(positions.len() as u64)
    }

    async fn zadd(&self, key: &str, members: &[ScoredMember]) -> StoreResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut map = self.write().await;
        let zset = upsert(&mut map, key, new_zset, Value::as_zset_mut)?;
        let added = members
            .iter()
            .filter(|m| zset.insert(m.member.clone(), m.score).is_none())
            .count();
        Ok(added as u64)
    }

    async fn zcard(&self, key: &str) -> StoreResult<u64> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_zset)?.map_or(0, |z| z.len() as u64))
    }

    async fn zincr_by(&self, key: &str, member: &str, delta: f64) -> StoreResult<f64> {
        let mut map = self.write().await;
        let zset = upsert(&mut map, key, new_zset, Value::as_zset_mut)?;
        let score = zset.entry(member.to_string()).or_insert(0.0);
        *score += delta;
        Ok(*score)
    }

    async fn zrem(&self, key: &str, members: &[String]) -> StoreResult<u64> {
        let mut map = self.write().await;
        let Some(zset) = modify(&mut map, key, Value::as_zset_mut)? else {
            return Ok(0);
        };
        let removed = members.iter().filter(|m| zset.remove(*m).is_some()).count();
        remove_if_empty(&mut map, key);
        Ok(removed as u64)
    }

    async fn zrange(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: RangeOrder,
    ) -> StoreResult<Vec<String>> {
        Ok(self
            .zrange_with_scores(key, start, stop, order)
            .await?
            .into_iter()
            .map(|m| m.member)
            .collect())
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: RangeOrder,
    ) -> StoreResult<Vec<ScoredMember>> {
        let map = self.keyspace.read().await;
        let Some(zset) = read(&map, key, Value::as_zset)? else {
            return Ok(Vec::new());
        };
        let members = sorted_members(zset, order);
        Ok(match normalize_range(start, stop, members.len()) {
            Some((from, to)) => members[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    async fn zrange_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        order: RangeOrder,
    ) -> StoreResult<Vec<ScoredMember>> {
        let map = self.keyspace.read().await;
        let Some(zset) = read(&map, key, Value::as_zset)? else {
            return Ok(Vec::new());
        };
        Ok(sorted_members(zset, order)
            .into_iter()
            .filter(|m| m.score >= min && m.score <= max)
            .collect())
    }

    async fn zrank(&self, key: &str, member: &str, order: RangeOrder) -> StoreResult<Option<u64>> {
        let map = self.keyspace.read().await;
        let Some(zset) = read(&map, key, Value::as_zset)? else {
            return Ok(None);
        };
        Ok(sorted_members(zset, order)
            .iter()
            .position(|m| m.member == member)
            .map(|p| p as u64))
    }

    async fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<f64>> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_zset)?.and_then(|z| z.get(member).copied()))
    }

    async fn zcount(&self, key: &str, min: f64, max: f64) -> StoreResult<u64> {
        let map = self.keyspace.read().await;
        Ok(read(&map, key, Value::as_zset)?.map_or(0, |z| {
            z.values().filter(|s| **s >= min && **s <= max).count() as u64
        }))
    }

    async fn zrem_range_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<u64> {
        let mut map = self.write().await;
        let Some(zset) = modify(&mut map, key, Value::as_zset_mut)? else {
            return Ok(0);
        };
        let before = zset.len();
        zset.retain(|_, s| *s < min || *s > max);
        let removed = before - zset.len();
        remove_if_empty(&mut map, key);
        Ok(removed as u64)
    }

    async fn zscan(
        &self,
        key: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage<ScoredMember>> {
        let matcher = compile_glob(pattern)?;
        let map = self.keyspace.read().await;

        let members: Vec<ScoredMember> = match read(&map, key, Value::as_zset)? {
            Some(zset) => sorted_members(zset, RangeOrder::Ascending)
                .into_iter()
                .filter(|m| matcher.is_match(&m.member))
                .collect(),
            None => Vec::new(),
        };

        Ok(page(members, cursor, count))
    }

    async fn publish(&self, channel: &str, message: &str) -> StoreResult<u64> {
        let channels = self.channels.read().await;
        // No subscribers is not an error: the message is simply dropped.
        let delivered = channels
            .get(channel)
            .map_or(0, |tx| tx.send(message.to_string()).unwrap_or(0));
        Ok(delivered as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_compile_glob() {
        let re = compile_glob("user:*").unwrap();
        assert!(re.is_match("user:1"));
        assert!(re.is_match("user:"));
        assert!(!re.is_match("session:1"));

        let re = compile_glob("h?llo").unwrap();
        assert!(re.is_match("hello"));
        assert!(!re.is_match("heello"));

        let re = compile_glob("h[ae]llo").unwrap();
        assert!(re.is_match("hallo"));
        assert!(!re.is_match("hillo"));

        let re = compile_glob("h[^e]llo").unwrap();
        assert!(re.is_match("hallo"));
        assert!(!re.is_match("hello"));

        let re = compile_glob("a.b\\*").unwrap();
        assert!(re.is_match("a.b*"));
        assert!(!re.is_match("axb*"));
    }

    #[test]
    fn test_normalize_range() {
        assert_eq!(normalize_range(0, -1, 3), Some((0, 2)));
        assert_eq!(normalize_range(-2, -1, 3), Some((1, 2)));
        assert_eq!(normalize_range(1, 100, 3), Some((1, 2)));
        assert_eq!(normalize_range(-100, 0, 3), Some((0, 0)));
        assert_eq!(normalize_range(2, 1, 3), None);
        assert_eq!(normalize_range(5, 10, 3), None);
        assert_eq!(normalize_range(0, -1, 0), None);
    }

    #[test]
    fn test_page_walks_all_items() {
        let items: Vec<u32> = (0..5).collect();
        let first = page(items.clone(), 0, 2);
        assert_eq!(first.items, vec![0, 1]);
        assert_eq!(first.cursor, 2);

        let last = page(items, 4, 2);
        assert_eq!(last.items, vec![4]);
        assert!(last.is_last());
    }

    #[tokio::test]
    async fn test_wrong_type_is_reported() {
        let store = MemoryStore::new();
        store.set("k", "v", SetCondition::Always, None).await.unwrap();

        let result = store.sadd("k", &strings(&["a"])).await;
        assert!(matches!(result, Err(StoreError::WrongType(_))));
    }

    #[tokio::test]
    async fn test_set_conditions() {
        let store = MemoryStore::new();

        assert!(!store.set("k", "v", SetCondition::IfPresent, None).await.unwrap());
        assert!(store.set("k", "v", SetCondition::IfAbsent, None).await.unwrap());
        assert!(!store.set("k", "w", SetCondition::IfAbsent, None).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.set("k", "w", SetCondition::IfPresent, None).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("w".to_string()));
    }

    #[tokio::test]
    async fn test_ttl_conventions() {
        let store = MemoryStore::new();
        assert_eq!(store.ttl("missing").await.unwrap(), -2);

        store.set("k", "v", SetCondition::Always, None).await.unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), -1);

        assert!(store.expire("k", 30).await.unwrap());
        assert_eq!(store.ttl("k").await.unwrap(), 30);

        // A plain SET discards the previous TTL.
        store.set("k", "v2", SetCondition::Always, None).await.unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_expired_key_is_gone() {
        let store = MemoryStore::new();
        store.set("k", "v", SetCondition::Always, None).await.unwrap();
        store.expire("k", 0).await.unwrap();

        assert!(!store.exists("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.ttl("k").await.unwrap(), -2);
    }

    #[tokio::test]
    async fn test_incr_by_rejects_non_integer() {
        let store = MemoryStore::new();
        store.set("k", "abc", SetCondition::Always, None).await.unwrap();

        assert!(matches!(
            store.incr_by("k", 1).await,
            Err(StoreError::Operation(_))
        ));
        assert_eq!(store.incr_by("counter", 5).await.unwrap(), 5);
        assert_eq!(store.incr_by("counter", -7).await.unwrap(), -2);
    }

    #[tokio::test]
    async fn test_empty_aggregates_are_removed() {
        let store = MemoryStore::new();
        store.sadd("s", &strings(&["a"])).await.unwrap();
        assert_eq!(store.srem("s", &strings(&["a"])).await.unwrap(), 1);
        assert!(!store.exists("s").await.unwrap());

        store.rpush("l", &strings(&["x"])).await.unwrap();
        assert_eq!(store.lpop("l").await.unwrap(), Some("x".to_string()));
        assert!(!store.exists("l").await.unwrap());
    }

    #[tokio::test]
    async fn test_lpush_prepends_in_argument_order() {
        let store = MemoryStore::new();
        store.lpush("l", &strings(&["a", "b", "c"])).await.unwrap();

        assert_eq!(
            store.lrange("l", 0, -1).await.unwrap(),
            strings(&["c", "b", "a"])
        );
    }

    #[tokio::test]
    async fn test_lrem_directions() {
        let store = MemoryStore::new();
        let values = strings(&["a", "b", "a", "c", "a"]);

        store.rpush("head", &values).await.unwrap();
        assert_eq!(store.lrem("head", 2, "a").await.unwrap(), 2);
        assert_eq!(
            store.lrange("head", 0, -1).await.unwrap(),
            strings(&["b", "c", "a"])
        );

        store.rpush("tail", &values).await.unwrap();
        assert_eq!(store.lrem("tail", -1, "a").await.unwrap(), 1);
        assert_eq!(
            store.lrange("tail", 0, -1).await.unwrap(),
            strings(&["a", "b", "a", "c"])
        );

        store.rpush("all", &values).await.unwrap();
        assert_eq!(store.lrem("all", 0, "a").await.unwrap(), 3);
        assert_eq!(store.lrange("all", 0, -1).await.unwrap(), strings(&["b", "c"]));
    }

    #[tokio::test]
    async fn test_lset_errors() {
        let store = MemoryStore::new();
        assert!(store.lset("missing", 0, "x").await.is_err());

        store.rpush("l", &strings(&["a"])).await.unwrap();
        assert!(store.lset("l", 3, "x").await.is_err());
        store.lset("l", -1, "z").await.unwrap();
        assert_eq!(store.lindex("l", 0).await.unwrap(), Some("z".to_string()));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let store = MemoryStore::new();
        assert_eq!(store.publish("news", "nobody listening").await.unwrap(), 0);

        let mut rx = store.subscribe("news").await;
        assert_eq!(store.publish("news", "hello").await.unwrap(), 1);
        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    /// Marks every entry as already expired.
    async fn expire_all_now(store: &MemoryStore) {
        let now = Instant::now();
        for entry in store.keyspace.write().await.values_mut() {
            entry.expires_at = Some(now);
        }
    }

    async fn entry_count(store: &MemoryStore) -> usize {
        store.keyspace.read().await.len()
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_rejected() {
        let store = MemoryStore::new();

        let err = store
            .set("k", "v", SetCondition::Always, Some(i64::MAX as u64))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::operation("ERR invalid expire time"));
        assert!(!store.exists("k").await.unwrap());

        store.set("k", "v", SetCondition::Always, None).await.unwrap();
        assert!(store.expire("k", u64::MAX).await.is_err());
        assert_eq!(store.ttl("k").await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_zero_expire_deletes_key() {
        let store = MemoryStore::new();
        store.set("k", "v", SetCondition::Always, None).await.unwrap();

        assert!(store.expire("k", 0).await.unwrap());
        assert_eq!(entry_count(&store).await, 0);
        assert!(!store.expire("k", 0).await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_frees_expired_entries() {
        let store = MemoryStore::new();
        for i in 0..1000 {
            store
                .set(&format!("k{i}"), "v", SetCondition::Always, None)
                .await
                .unwrap();
        }
        expire_all_now(&store).await;

        assert!(store.keys("*").await.unwrap().is_empty());
        assert_eq!(entry_count(&store).await, 0);

        for i in 0..10 {
            store
                .set(&format!("n{i}"), "v", SetCondition::Always, None)
                .await
                .unwrap();
        }
        assert_eq!(entry_count(&store).await, 10);
    }

    #[tokio::test]
    async fn test_writes_sweep_expired_entries() {
        let store = MemoryStore::new();
        store.set("stale", "v", SetCondition::Always, None).await.unwrap();
        expire_all_now(&store).await;

        for i in 0..SWEEP_EVERY {
            store
                .set(&format!("k{i}"), "v", SetCondition::Always, None)
                .await
                .unwrap();
        }

        assert!(!store.keyspace.read().await.contains_key("stale"));
        assert_eq!(entry_count(&store).await, SWEEP_EVERY as usize);
    }
}
