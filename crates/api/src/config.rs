use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub mongo_url: String,
    pub mongo_database: String,
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    /// Embedding service endpoint (e.g., http://localhost:8080/embed)
    #[serde(default)]
    pub embedding_url: Option<String>,
    /// Cart inactivity TTL in seconds.
    #[serde(default = "default_cart_ttl")]
    pub cart_ttl_secs: u64,
    /// Search result cache TTL in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Requests allowed per rate-limit window.
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: i64,
    /// Rate-limit window length in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

fn default_cart_ttl() -> u64 {
    60 * 60 // one hour of inactivity
}

fn default_cache_ttl() -> u64 {
    60 * 60
}

fn default_rate_limit_requests() -> i64 {
    30
}

fn default_rate_limit_window() -> u64 {
    60
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
