//! Daily hot-products ranking for Redis (sorted sets).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use redis::AsyncCommands;

/// Store for the per-day product view ranking.
///
/// Scores are additive and non-negative. Ordering on equal scores follows
/// Redis's sorted-set iteration and is not part of the contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HotProductsStore: Send + Sync {
    /// Add `score` to the product's cumulative rank for today.
    async fn record_view(&self, product_id: &str, score: f64) -> Result<()>;

    /// Top-N products by descending score for the given date.
    async fn top(&self, date: NaiveDate, n: usize) -> Result<Vec<(String, f64)>>;
}

/// Redis implementation of HotProductsStore.
#[derive(Clone)]
pub struct RedisHotProductsStore {
    client: redis::Client,
}

impl RedisHotProductsStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn hot_key(date: NaiveDate) -> String {
        format!("hot_products:{}", date.format("%Y-%m-%d"))
    }
}

#[async_trait]
impl HotProductsStore for RedisHotProductsStore {
    async fn record_view(&self, product_id: &str, score: f64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        // "Today" is the process-local calendar date, same as the callers'.
        let key = Self::hot_key(Local::now().date_naive());

        let _: f64 = conn.zincr(&key, product_id, score).await?;
        Ok(())
    }

    async fn top(&self, date: NaiveDate, n: usize) -> Result<Vec<(String, f64)>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::hot_key(date);

        let pairs: Vec<(String, f64)> = conn
            .zrevrange_withscores(&key, 0, n as isize - 1)
            .await?;
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_key_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(RedisHotProductsStore::hot_key(date), "hot_products:2025-03-09");
    }
}
