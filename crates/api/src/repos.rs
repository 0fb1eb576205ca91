//! Database repositories (PostgreSQL).
//!
//! This module contains traits and implementations for relational access.
//! Each repository is abstracted behind a trait to enable mocking in tests.
//! All SQL is parameterized; bulk loads use conflict-skip semantics on
//! natural keys so loaders can be re-run.
//!
//! ## Repositories
//!
//! - **users** - Users and seller accounts (CSV loads, join-date reference data)
//! - **categories** - Category upserts and name → id resolution
//! - **products** - Product loads, generator reference rows, full-text search
//! - **orders** - Order/order-item loads, bulk purchase writes, order creation
//! - **embeddings** - pgvector upserts and similarity queries
//!
//! ## Usage in Handlers
//!
//! Repositories are accessed via `state.repos`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let hits = state.repos.products.search("mug", None, None, 20).await?;
//!     let similar = state.repos.embeddings.similar_to_product(7, 5).await?;
//! }
//! ```

mod categories;
mod embeddings;
mod orders;
mod products;
mod users;

pub use categories::{CategoryRepo, NewCategory, PgCategoryRepo};
pub use embeddings::{EmbeddingRepo, PgEmbeddingRepo};
pub use orders::{NewOrderItem, OrderRepo, PgOrderRepo};
pub use products::{NewProduct, PgProductRepo, ProductRepo};
pub use users::{NewSeller, NewUser, PgUserRepo, UserRepo};

#[cfg(test)]
pub use categories::MockCategoryRepo;
#[cfg(test)]
pub use embeddings::MockEmbeddingRepo;
#[cfg(test)]
pub use orders::MockOrderRepo;
#[cfg(test)]
pub use products::MockProductRepo;
#[cfg(test)]
pub use users::MockUserRepo;

use std::sync::Arc;

/// Collection of all database repositories.
#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub categories: Arc<dyn CategoryRepo>,
    pub products: Arc<dyn ProductRepo>,
    pub orders: Arc<dyn OrderRepo>,
    pub embeddings: Arc<dyn EmbeddingRepo>,
}
