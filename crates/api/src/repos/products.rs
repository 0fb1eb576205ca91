//! Product repository for PostgreSQL, including full-text search.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::{Product, ProductRef, SearchHit};

/// A product row to load. Conflicts on name are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub category_id: i64,
    pub seller_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

/// Repository for product operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Insert products, skipping names that already exist.
    async fn insert_many(&self, products: &[NewProduct]) -> Result<()>;

    /// All products as slim (id, category_id, price_cents) reference rows.
    async fn refs(&self) -> Result<Vec<ProductRef>>;

    /// Find a product by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>>;

    /// Ranked full-text search over name + description, with optional
    /// category and price-cents range filters.
    async fn search(
        &self,
        query: &str,
        category: Option<i64>,
        price_range: Option<(i64, i64)>,
        limit: i64,
    ) -> Result<Vec<SearchHit>>;
}

/// PostgreSQL implementation of ProductRepo.
#[derive(Clone)]
pub struct PgProductRepo {
    pool: Pool<Postgres>,
}

impl PgProductRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepo for PgProductRepo {
    async fn insert_many(&self, products: &[NewProduct]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for product in products {
            sqlx::query(
                "INSERT INTO products (category_id, seller_id, name, description, price_cents) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(product.category_id)
            .bind(product.seller_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price_cents)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn refs(&self) -> Result<Vec<ProductRef>> {
        let rows = sqlx::query_as::<_, ProductRef>(
            "SELECT id, category_id, price_cents FROM products",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, category_id, seller_id, name, description, price_cents \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn search(
        &self,
        query: &str,
        category: Option<i64>,
        price_range: Option<(i64, i64)>,
        limit: i64,
    ) -> Result<Vec<SearchHit>> {
        let (price_min, price_max) = match price_range {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };

        let hits = sqlx::query_as::<_, SearchHit>(
            "SELECT id, name, price_cents, \
                    ts_rank_cd(search_vector, plainto_tsquery($1)) AS rank \
             FROM products \
             WHERE search_vector @@ plainto_tsquery($1) \
               AND ($2::bigint IS NULL OR category_id = $2) \
               AND ($3::bigint IS NULL OR price_cents BETWEEN $3 AND $4) \
             ORDER BY rank DESC \
             LIMIT $5",
        )
        .bind(query)
        .bind(category)
        .bind(price_min)
        .bind(price_max)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(hits)
    }
}
