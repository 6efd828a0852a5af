use std::sync::Arc;

use rdv_core::MemoryStore;
use tokio::sync::RwLock;

/// Shared application state.
///
/// The store handle is constructed once at startup and passed down to every
/// handler. The write lock serializes the duplicate-check + insert pair, so
/// two concurrent imports cannot both insert the same UID.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<MemoryStore>>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }

    pub fn store(&self) -> &RwLock<MemoryStore> {
        &self.store
    }
}
