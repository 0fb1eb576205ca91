use std::sync::Arc;

use crate::{
    config::Config,
    repos::Repos,
    services::{CachedSearch, EmbeddingProvider, GraphStore, PreferenceStore},
    stores::Stores,
};

/// Composition root for everything the handlers touch. Built once at startup;
/// every store and service handle is injected here, never reached through a
/// global.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Database repositories (PostgreSQL).
    pub repos: Repos,
    /// Ephemeral stores (Redis).
    pub stores: Stores,
    /// Document store (MongoDB).
    pub preferences: Arc<dyn PreferenceStore>,
    /// Graph store (Neo4j).
    pub graph: Arc<dyn GraphStore>,
    /// Embedding provider.
    pub embedding: Arc<dyn EmbeddingProvider>,
    /// Cached full-text search.
    pub search: CachedSearch,
}
