//! Generic JSON cache and counters for Redis.

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

/// Generic cache primitives: JSON values with TTL, plus plain counters.
///
/// `get_json` distinguishes "absent" (`None`) from any stored value, including
/// falsy ones (`null`, `0`, `""`). A payload that fails to parse as JSON is
/// reported as absent so callers re-fetch instead of choking on a corrupt
/// entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Health check - verify Redis connectivity.
    async fn ping(&self) -> Result<bool>;

    /// Fetch and parse a cached JSON value.
    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store a JSON value with a TTL (single SETEX, all-or-nothing).
    async fn set_json(&self, key: &str, value: &serde_json::Value, ttl_secs: u64) -> Result<()>;

    /// Increment a counter key, returning the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Read a counter key. `None` when the counter was never incremented.
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;
}

/// Redis implementation of CacheStore.
#[derive(Clone)]
pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn ping(&self) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(result == "PONG")
    }

    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    // Corrupt entry: treat as a miss, let the TTL reap it.
                    tracing::warn!(key, %err, "discarding malformed cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set_json(&self, key: &str, value: &serde_json::Value, ttl_secs: u64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(value)?;

        let _: () = conn.set_ex(key, json, ttl_secs).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: i64 = conn.incr(key, 1).await?;
        Ok(count)
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let value: Option<i64> = conn.get(key).await?;
        Ok(value)
    }
}
