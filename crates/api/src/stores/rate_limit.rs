//! Rate limiting for Redis.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

/// Rate limiter trait for checking and incrementing counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count a request against the caller's current window.
    /// Returns Allowed while the counter is within the limit, Exceeded after.
    async fn check(&self, user_id: &str, endpoint: &str) -> Result<RateLimitResult>;
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Under the limit, includes current count.
    Allowed(i64),
    /// Over the limit, includes current count.
    Exceeded(i64),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

/// Redis implementation of RateLimiter.
///
/// Fixed-window counters: one key per (user, endpoint, window index), where
/// the window index is epoch seconds divided by the window length. A fresh
/// key appears at each window boundary, so bursts straddling the boundary can
/// see up to 2x the limit. That is the documented behavior of this strategy,
/// not a bug.
#[derive(Clone)]
pub struct RedisRateLimiter {
    client: redis::Client,
    limit: i64,
    window_secs: u64,
}

impl RedisRateLimiter {
    pub fn new(client: redis::Client, limit: i64, window_secs: u64) -> Self {
        Self {
            client,
            limit,
            window_secs,
        }
    }

    fn bucket_key(user_id: &str, endpoint: &str, now_secs: i64, window_secs: u64) -> String {
        let window_index = now_secs / window_secs as i64;
        format!("rl:{}:{}:{}", user_id, endpoint, window_index)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, user_id: &str, endpoint: &str) -> Result<RateLimitResult> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::bucket_key(user_id, endpoint, Utc::now().timestamp(), self.window_secs);

        let count: i64 = redis::cmd("INCR").arg(&key).query_async(&mut conn).await?;

        if count == 1 {
            // First hit in this window owns the TTL. The INCR→EXPIRE pair is
            // not atomic; the unexpired-key window left by a crash in between
            // is bounded by the next window rollover.
            let _: () = redis::cmd("EXPIRE")
                .arg(&key)
                .arg(self.window_secs)
                .query_async(&mut conn)
                .await?;
        }

        if count > self.limit {
            Ok(RateLimitResult::Exceeded(count))
        } else {
            Ok(RateLimitResult::Allowed(count))
        }
    }
}
