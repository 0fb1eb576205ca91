use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub seller_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

/// Slim product row the purchase generator samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ProductRef {
    pub id: i64,
    pub category_id: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub created_at: NaiveDate,
}

/// One full-text search hit. Cached verbatim, so the serialized form is the
/// contract between the repo and the cache layer.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub rank: f32,
}

/// Vector-similarity hit from pgvector.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SimilarProduct {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub score: f64,
}

/// Co-purchase recommendation from the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub name: String,
    pub freq: i64,
}

/// Mongo `user_preferences` document. User ids arrive as codes ("U12").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    #[serde(default)]
    pub liked_categories: Vec<String>,
}

/// A single PURCHASED edge destined for the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEdge {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub date: NaiveDate,
}
