//! Small option types passed to store commands.

/// Direction of a rank or score range over a sorted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeOrder {
    #[default]
    Ascending,
    Descending,
}

/// Existence condition attached to a `SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetCondition {
    /// Unconditional write.
    #[default]
    Always,
    /// Write only if the key does not exist (`NX`).
    IfAbsent,
    /// Write only if the key already exists (`XX`).
    IfPresent,
}
