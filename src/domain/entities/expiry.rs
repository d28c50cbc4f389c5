//! Expiry state of a key as reported by the store.

/// Remaining lifetime of a key.
///
/// Mirrors the store's `TTL` reply convention: `-1` for a key without an
/// expiry, `-2` for a key that does not exist, otherwise the remaining
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The key exists and never expires.
    Persistent,
    /// The key does not exist (or has already expired).
    Missing,
    /// The key expires in the given number of seconds.
    Remaining(u64),
}

impl Expiry {
    /// Interprets a raw `TTL` reply.
    pub fn from_ttl_reply(reply: i64) -> Self {
        match reply {
            -2 => Self::Missing,
            r if r < 0 => Self::Persistent,
            r => Self::Remaining(r as u64),
        }
    }
}
