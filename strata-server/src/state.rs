//! Shared application state.

use std::sync::Arc;

use strata_shard::registry::ShardRegistry;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The per-shard pool registry. One per process.
    pub registry: Arc<ShardRegistry>,
}

impl AppState {
    /// Create application state around a shard registry.
    pub fn new(registry: ShardRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}
