//! Ephemeral stores (Redis).
//!
//! This module contains traits and implementations for ephemeral data storage.
//! All data stored here expires via TTL or rolls over by key (daily rankings,
//! rate-limit windows).
//!
//! ## Stores
//!
//! - **cart** - Per-user shopping cart hashes (TTL refreshed on mutation)
//! - **rate_limit** - Fixed-window request counters
//! - **hot_products** - Per-day product view ranking (sorted sets)
//! - **cache** - Generic JSON cache + counters (search results, hit/miss stats)
//!
//! ## Redis Key Patterns
//!
//! ```text
//! cart:{user_id}                      → hash of product_id → quantity
//! rl:{user_id}:{endpoint}:{window}    → request count (expires after window)
//! hot_products:{YYYY-MM-DD}           → sorted set of product_id by score
//! search:{q}:{cat}:{price}:{limit}    → cached search result JSON
//! stats:search:hits / stats:search:miss → global counters
//! ```
//!
//! ## Usage in Handlers
//!
//! Stores are accessed via `state.stores`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     state.stores.cart.add(&user_id, &product_id, 1).await?;
//!     let top = state.stores.hot_products.top(today, 10).await?;
//! }
//! ```

mod cache;
mod cart;
mod hot_products;
mod rate_limit;

pub use cache::{CacheStore, RedisCacheStore};
pub use cart::{CartStore, RedisCartStore};
pub use hot_products::{HotProductsStore, RedisHotProductsStore};
pub use rate_limit::{RateLimitResult, RateLimiter, RedisRateLimiter};

#[cfg(test)]
pub use cache::MockCacheStore;
#[cfg(test)]
pub use cart::MockCartStore;
#[cfg(test)]
pub use hot_products::MockHotProductsStore;
#[cfg(test)]
pub use rate_limit::MockRateLimiter;

use std::sync::Arc;

/// Collection of all ephemeral stores.
#[derive(Clone)]
pub struct Stores {
    pub cart: Arc<dyn CartStore>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub hot_products: Arc<dyn HotProductsStore>,
    pub cache: Arc<dyn CacheStore>,
}
