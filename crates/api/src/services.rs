//! External collaborators and domain services.
//!
//! This module contains traits and implementations for the document store,
//! the graph store, and the embedding provider, plus the two services built
//! on top of the stores and repositories: the cached product search and the
//! cross-store purchase generator.
//!
//! ## Services
//!
//! - **preferences** - MongoDB document store (user_preferences reads, ETL inserts)
//! - **graph** - Neo4j graph store (constraints, PURCHASED upserts, recommendations)
//! - **embedding** - text → 384-float vector provider (HTTP service or seeded sim)
//! - **search** - full-text search wrapped in the Redis cache with hit/miss stats
//! - **generator** - synthetic purchase batches written to Postgres + Neo4j
//!
//! ## Usage in Handlers
//!
//! Services are accessed via `AppState`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let hits = state.search.search("espresso", None, None, 20).await?;
//!     let recs = state.graph.also_bought(42, 5).await?;
//! }
//! ```

mod embedding;
mod generator;
mod graph;
mod preferences;
mod search;

pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider, SimEmbeddingProvider, EMBEDDING_DIM};
pub use generator::PurchaseGenerator;
pub use graph::{GraphProduct, GraphStore, GraphUser, Neo4jGraphStore};
pub use preferences::{MongoPreferenceStore, PreferenceStore};
pub use search::{CachedSearch, SearchStats};

#[cfg(test)]
pub use embedding::MockEmbeddingProvider;
#[cfg(test)]
pub use graph::MockGraphStore;
#[cfg(test)]
pub use preferences::MockPreferenceStore;
