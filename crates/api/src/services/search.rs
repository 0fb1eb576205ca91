//! Full-text product search with a Redis result cache and hit-rate counters.

use std::sync::Arc;

use anyhow::Result;

use crate::models::SearchHit;
use crate::repos::ProductRepo;
use crate::stores::CacheStore;

const HITS_KEY: &str = "stats:search:hits";
const MISS_KEY: &str = "stats:search:miss";

/// Process-wide cache hit/miss counters. These live in the cache store itself,
/// shared across instances; absent counters read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub hits: i64,
    pub misses: i64,
}

/// Cached full-text search.
///
/// Each distinct (query, category, price range, limit) tuple maps to one
/// cache key. Entries expire by TTL only; underlying catalog mutations are
/// not propagated (accepted staleness window). A cache entry that fails to
/// deserialize counts as a miss and is overwritten by the fresh result.
#[derive(Clone)]
pub struct CachedSearch {
    cache: Arc<dyn CacheStore>,
    products: Arc<dyn ProductRepo>,
    ttl_secs: u64,
}

impl CachedSearch {
    pub fn new(cache: Arc<dyn CacheStore>, products: Arc<dyn ProductRepo>, ttl_secs: u64) -> Self {
        Self {
            cache,
            products,
            ttl_secs,
        }
    }

    fn cache_key(
        query: &str,
        category: Option<i64>,
        price_range: Option<(i64, i64)>,
        limit: i64,
    ) -> String {
        let cat = category.map_or_else(|| "all".to_string(), |c| c.to_string());
        let price = price_range.map_or_else(|| "all".to_string(), |(lo, hi)| format!("{}-{}", lo, hi));
        format!("search:{}:{}:{}:{}", query, cat, price, limit)
    }

    pub async fn search(
        &self,
        query: &str,
        category: Option<i64>,
        price_range: Option<(i64, i64)>,
        limit: i64,
    ) -> Result<Vec<SearchHit>> {
        let key = Self::cache_key(query, category, price_range, limit);

        if let Some(value) = self.cache.get_json(&key).await? {
            match serde_json::from_value::<Vec<SearchHit>>(value) {
                Ok(hits) => {
                    self.cache.incr(HITS_KEY).await?;
                    return Ok(hits);
                }
                Err(err) => {
                    // Shape drifted (or the entry is garbage): fall through to
                    // a miss and overwrite.
                    tracing::warn!(key, %err, "cached search result failed to decode");
                }
            }
        }

        self.cache.incr(MISS_KEY).await?;

        let hits = self.products.search(query, category, price_range, limit).await?;
        self.cache
            .set_json(&key, &serde_json::to_value(&hits)?, self.ttl_secs)
            .await?;
        Ok(hits)
    }

    pub async fn stats(&self) -> Result<SearchStats> {
        let hits = self.cache.get_i64(HITS_KEY).await?.unwrap_or(0);
        let misses = self.cache.get_i64(MISS_KEY).await?.unwrap_or(0);
        Ok(SearchStats { hits, misses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    use crate::repos::MockProductRepo;
    use crate::stores::MockCacheStore;

    fn sample_hits() -> Vec<SearchHit> {
        vec![
            SearchHit {
                id: 1,
                name: "Espresso Machine".to_string(),
                price_cents: 24_999,
                rank: 0.62,
            },
            SearchHit {
                id: 7,
                name: "Espresso Cups".to_string(),
                price_cents: 1_499,
                rank: 0.31,
            },
        ]
    }

    #[tokio::test]
    async fn miss_queries_postgres_and_fills_cache() {
        let hits = sample_hits();
        let key = "search:espresso:all:all:20";

        let mut cache = MockCacheStore::new();
        cache
            .expect_get_json()
            .with(eq(key))
            .times(1)
            .returning(|_| Ok(None));
        cache
            .expect_incr()
            .with(eq(MISS_KEY))
            .times(1)
            .returning(|_| Ok(1));
        let expected_value = serde_json::to_value(&hits).unwrap();
        cache
            .expect_set_json()
            .withf(move |k, v, ttl| k == "search:espresso:all:all:20" && *v == expected_value && *ttl == 3600)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let returned = hits.clone();
        let mut products = MockProductRepo::new();
        products
            .expect_search()
            .with(eq("espresso"), eq(None::<i64>), eq(None::<(i64, i64)>), eq(20))
            .times(1)
            .returning(move |_, _, _, _| Ok(returned.clone()));

        let search = CachedSearch::new(Arc::new(cache), Arc::new(products), 3600);
        let result = search.search("espresso", None, None, 20).await.unwrap();

        assert_eq!(result, hits);
    }

    #[tokio::test]
    async fn hit_skips_postgres_and_returns_identical_results() {
        let hits = sample_hits();
        let cached = serde_json::to_value(&hits).unwrap();

        let mut cache = MockCacheStore::new();
        cache
            .expect_get_json()
            .times(1)
            .returning(move |_| Ok(Some(cached.clone())));
        cache
            .expect_incr()
            .with(eq(HITS_KEY))
            .times(1)
            .returning(|_| Ok(1));

        // No expectations on the repo: any call panics the test.
        let products = MockProductRepo::new();

        let search = CachedSearch::new(Arc::new(cache), Arc::new(products), 3600);
        let result = search.search("espresso", None, None, 20).await.unwrap();

        assert_eq!(result, hits);
    }

    #[tokio::test]
    async fn undecodable_cache_entry_counts_as_miss() {
        let hits = sample_hits();

        let mut cache = MockCacheStore::new();
        cache
            .expect_get_json()
            .times(1)
            .returning(|_| Ok(Some(serde_json::json!({"not": "a result list"}))));
        cache
            .expect_incr()
            .with(eq(MISS_KEY))
            .times(1)
            .returning(|_| Ok(1));
        cache.expect_set_json().times(1).returning(|_, _, _| Ok(()));

        let returned = hits.clone();
        let mut products = MockProductRepo::new();
        products
            .expect_search()
            .times(1)
            .returning(move |_, _, _, _| Ok(returned.clone()));

        let search = CachedSearch::new(Arc::new(cache), Arc::new(products), 3600);
        let result = search.search("espresso", None, None, 20).await.unwrap();

        assert_eq!(result, hits);
    }

    #[tokio::test]
    async fn cache_key_renders_missing_filters_as_all() {
        assert_eq!(
            CachedSearch::cache_key("mug", None, None, 20),
            "search:mug:all:all:20"
        );
        assert_eq!(
            CachedSearch::cache_key("mug", Some(3), Some((100, 5000)), 5),
            "search:mug:3:100-5000:5"
        );
    }

    #[tokio::test]
    async fn stats_read_zero_for_uninitialized_counters() {
        let mut cache = MockCacheStore::new();
        cache.expect_get_i64().with(eq(HITS_KEY)).returning(|_| Ok(None));
        cache
            .expect_get_i64()
            .with(eq(MISS_KEY))
            .returning(|_| Ok(Some(4)));

        let search = CachedSearch::new(Arc::new(cache), Arc::new(MockProductRepo::new()), 3600);
        let stats = search.stats().await.unwrap();

        assert_eq!(stats, SearchStats { hits: 0, misses: 4 });
    }
}
