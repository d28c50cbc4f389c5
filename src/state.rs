//! Shared application state handed to every HTTP handler.

use crate::application::services::KvService;
use crate::domain::store::KeyValueStore;
use std::sync::Arc;

/// Cloned into each request; the facade itself is shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<KvService>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv: Arc::new(KvService::new(store)),
        }
    }
}
