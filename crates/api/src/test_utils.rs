//! Shared test utilities for API handler tests.
//!
//! Provides a flexible `TestStateBuilder` for constructing `AppState`
//! instances with only the mocks needed for each test.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::TestStateBuilder;
//!
//! let mut cart = MockCartStore::new();
//! cart.expect_get().returning(|_| Ok(HashMap::new()));
//!
//! let state = TestStateBuilder::new()
//!     .with_cart_store(cart)
//!     .build();
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::repos::{
    MockCategoryRepo, MockEmbeddingRepo, MockOrderRepo, MockProductRepo, MockUserRepo, Repos,
};
use crate::services::{
    CachedSearch, MockEmbeddingProvider, MockGraphStore, MockPreferenceStore,
};
use crate::state::AppState;
use crate::stores::{
    MockCacheStore, MockCartStore, MockHotProductsStore, MockRateLimiter, Stores,
};

/// Creates a test configuration with dummy values.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        database_url: "postgres://test".to_string(),
        redis_url: "redis://test".to_string(),
        mongo_url: "mongodb://test".to_string(),
        mongo_database: "catalog_test".to_string(),
        neo4j_uri: "bolt://test:7687".to_string(),
        neo4j_user: "neo4j".to_string(),
        neo4j_password: "test".to_string(),
        embedding_url: None,
        cart_ttl_secs: 3600,
        cache_ttl_secs: 3600,
        rate_limit_requests: 30,
        rate_limit_window_secs: 60,
        env: "test".to_string(),
        sentry_dsn: None,
    }
}

/// Builder for constructing test `AppState` with custom mocks.
///
/// Uses default (empty) mocks for any repo/store/service not explicitly set.
/// This allows tests to only configure the mocks they actually need.
pub struct TestStateBuilder {
    user_repo: Option<MockUserRepo>,
    category_repo: Option<MockCategoryRepo>,
    product_repo: Option<MockProductRepo>,
    order_repo: Option<MockOrderRepo>,
    embedding_repo: Option<MockEmbeddingRepo>,
    cart_store: Option<MockCartStore>,
    rate_limiter: Option<MockRateLimiter>,
    hot_products_store: Option<MockHotProductsStore>,
    cache_store: Option<MockCacheStore>,
    preference_store: Option<MockPreferenceStore>,
    graph_store: Option<MockGraphStore>,
    embedding_provider: Option<MockEmbeddingProvider>,
}

impl TestStateBuilder {
    /// Creates a new builder with no mocks configured.
    pub fn new() -> Self {
        Self {
            user_repo: None,
            category_repo: None,
            product_repo: None,
            order_repo: None,
            embedding_repo: None,
            cart_store: None,
            rate_limiter: None,
            hot_products_store: None,
            cache_store: None,
            preference_store: None,
            graph_store: None,
            embedding_provider: None,
        }
    }

    #[allow(dead_code)]
    pub fn with_user_repo(mut self, repo: MockUserRepo) -> Self {
        self.user_repo = Some(repo);
        self
    }

    #[allow(dead_code)]
    pub fn with_category_repo(mut self, repo: MockCategoryRepo) -> Self {
        self.category_repo = Some(repo);
        self
    }

    pub fn with_product_repo(mut self, repo: MockProductRepo) -> Self {
        self.product_repo = Some(repo);
        self
    }

    pub fn with_order_repo(mut self, repo: MockOrderRepo) -> Self {
        self.order_repo = Some(repo);
        self
    }

    pub fn with_embedding_repo(mut self, repo: MockEmbeddingRepo) -> Self {
        self.embedding_repo = Some(repo);
        self
    }

    pub fn with_cart_store(mut self, store: MockCartStore) -> Self {
        self.cart_store = Some(store);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: MockRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_hot_products_store(mut self, store: MockHotProductsStore) -> Self {
        self.hot_products_store = Some(store);
        self
    }

    pub fn with_cache_store(mut self, store: MockCacheStore) -> Self {
        self.cache_store = Some(store);
        self
    }

    #[allow(dead_code)]
    pub fn with_preference_store(mut self, store: MockPreferenceStore) -> Self {
        self.preference_store = Some(store);
        self
    }

    pub fn with_graph_store(mut self, store: MockGraphStore) -> Self {
        self.graph_store = Some(store);
        self
    }

    pub fn with_embedding_provider(mut self, provider: MockEmbeddingProvider) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Builds the `AppState` using configured mocks or defaults.
    pub fn build(self) -> AppState {
        let config = test_config();

        let products: Arc<dyn crate::repos::ProductRepo> =
            Arc::new(self.product_repo.unwrap_or_else(MockProductRepo::new));
        let cache: Arc<dyn crate::stores::CacheStore> =
            Arc::new(self.cache_store.unwrap_or_else(MockCacheStore::new));

        let repos = Repos {
            users: Arc::new(self.user_repo.unwrap_or_else(MockUserRepo::new)),
            categories: Arc::new(self.category_repo.unwrap_or_else(MockCategoryRepo::new)),
            products: products.clone(),
            orders: Arc::new(self.order_repo.unwrap_or_else(MockOrderRepo::new)),
            embeddings: Arc::new(self.embedding_repo.unwrap_or_else(MockEmbeddingRepo::new)),
        };

        let stores = Stores {
            cart: Arc::new(self.cart_store.unwrap_or_else(MockCartStore::new)),
            rate_limiter: Arc::new(self.rate_limiter.unwrap_or_else(MockRateLimiter::new)),
            hot_products: Arc::new(
                self.hot_products_store
                    .unwrap_or_else(MockHotProductsStore::new),
            ),
            cache: cache.clone(),
        };

        // The search service shares the same cache/repo instances as the
        // state, so expectations set on either apply to both paths.
        let search = CachedSearch::new(cache, products, config.cache_ttl_secs);

        AppState {
            config,
            repos,
            stores,
            preferences: Arc::new(
                self.preference_store
                    .unwrap_or_else(MockPreferenceStore::new),
            ),
            graph: Arc::new(self.graph_store.unwrap_or_else(MockGraphStore::new)),
            embedding: Arc::new(
                self.embedding_provider
                    .unwrap_or_else(MockEmbeddingProvider::new),
            ),
            search,
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
