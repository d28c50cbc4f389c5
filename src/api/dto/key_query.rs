//! Query parameters of the `/redis/*` gateway routes.

use serde::Deserialize;

/// `?key=...`. A missing `key` is tolerated so the handlers can answer with
/// their benign defaults instead of a 400.
#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

impl KeyQuery {
    /// Returns the key when present and non-empty.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}
