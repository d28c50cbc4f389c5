//! Cursor-based scan pages.

/// One page returned by a cursor scan (`HSCAN`, `ZSCAN`).
///
/// A `cursor` of `0` means the iteration is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage<T> {
    pub cursor: u64,
    pub items: Vec<T>,
}

impl<T> ScanPage<T> {
    pub fn new(cursor: u64, items: Vec<T>) -> Self {
        Self { cursor, items }
    }

    pub fn is_last(&self) -> bool {
        self.cursor == 0
    }
}

/// Match pattern and page-size hint for a cursor scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub pattern: String,
    pub count: u64,
}

impl ScanOptions {
    pub fn new(pattern: impl Into<String>, count: u64) -> Self {
        Self {
            pattern: pattern.into(),
            count: count.max(1),
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new("*", 10)
    }
}
