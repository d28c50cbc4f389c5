//! Data Transfer Objects for gateway requests and responses.

pub mod health;
pub mod key_query;
