//! Shopping cart storage for Redis (hashes).

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

/// Store for cart operations. One hash per user, product id → quantity.
///
/// Every mutation refreshes the cart's TTL, so a cart disappears after the
/// configured period of inactivity. Concurrent writers to the same cart are
/// resolved by Redis's atomic HINCRBY/HSET, not by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Increment a product's quantity by `qty`, creating the line if absent.
    async fn add(&self, user_id: &str, product_id: &str, qty: i64) -> Result<()>;

    /// Set a product's quantity. `qty <= 0` removes the line.
    async fn update(&self, user_id: &str, product_id: &str, qty: i64) -> Result<()>;

    /// Full cart contents. Empty map when the cart is absent or expired.
    async fn get(&self, user_id: &str) -> Result<HashMap<String, i64>>;

    /// Delete the cart immediately.
    async fn clear(&self, user_id: &str) -> Result<()>;
}

/// Redis implementation of CartStore.
#[derive(Clone)]
pub struct RedisCartStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisCartStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn cart_key(user_id: &str) -> String {
        format!("cart:{}", user_id)
    }
}

#[async_trait]
impl CartStore for RedisCartStore {
    async fn add(&self, user_id: &str, product_id: &str, qty: i64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::cart_key(user_id);

        let _: i64 = conn.hincr(&key, product_id, qty).await?;
        let _: () = conn.expire(&key, self.ttl_secs as i64).await?;
        Ok(())
    }

    async fn update(&self, user_id: &str, product_id: &str, qty: i64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::cart_key(user_id);

        if qty <= 0 {
            let _: () = conn.hdel(&key, product_id).await?;
        } else {
            let _: () = conn.hset(&key, product_id, qty).await?;
        }
        // TTL refreshes even on removal; the cart was touched.
        let _: () = conn.expire(&key, self.ttl_secs as i64).await?;
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<HashMap<String, i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::cart_key(user_id);

        let items: HashMap<String, i64> = conn.hgetall(&key).await?;
        Ok(items)
    }

    async fn clear(&self, user_id: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::cart_key(user_id);

        let _: () = conn.del(&key).await?;
        Ok(())
    }
}
