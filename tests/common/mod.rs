#![allow(dead_code)]

use kv_gateway::application::services::KvService;
use kv_gateway::domain::KeyValueStore;
use kv_gateway::infrastructure::store::MemoryStore;
use kv_gateway::state::AppState;
use std::sync::Arc;

/// App state over a fresh in-process store.
pub fn create_test_state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()))
}

/// Facade over a fresh in-process store.
pub fn create_test_service() -> KvService {
    KvService::new(Arc::new(MemoryStore::new()))
}

/// App state over the given store, for tests that inject failures.
pub fn create_state_with(store: Arc<dyn KeyValueStore>) -> AppState {
    AppState::new(store)
}
