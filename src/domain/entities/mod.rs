//! Value types exchanged with the key-value store.
//!
//! The store owns all state; these are the shapes values take on the way in
//! and out of it.
//!
//! # Entity Types
//!
//! - [`ScoredMember`] - A sorted-set `(member, score)` tuple
//! - [`Expiry`] - Remaining lifetime of a key
//! - [`ScanPage`] / [`ScanOptions`] - Cursor scan pages and their parameters
//! - [`RangeOrder`] / [`SetCondition`] - Command modifiers

pub mod expiry;
pub mod options;
pub mod scan;
pub mod scored_member;

pub use expiry::Expiry;
pub use options::{RangeOrder, SetCondition};
pub use scan::{ScanOptions, ScanPage};
pub use scored_member::ScoredMember;
