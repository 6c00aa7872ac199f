use std::sync::Arc;

use crate::db::{MemoryStore, RecommendationStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecommendationStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
        Self { store }
    }

    /// State backed by the in-memory store, used when no database is
    /// configured and by the integration tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}
