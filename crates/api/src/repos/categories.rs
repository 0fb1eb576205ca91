//! Category repository for PostgreSQL.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

/// A category to upsert by name.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Repository for category operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// Insert categories, skipping names that already exist.
    async fn upsert_many(&self, categories: &[NewCategory]) -> Result<()>;

    /// Map of category name → id across all categories.
    async fn name_to_id(&self) -> Result<HashMap<String, i64>>;
}

/// PostgreSQL implementation of CategoryRepo.
#[derive(Clone)]
pub struct PgCategoryRepo {
    pool: Pool<Postgres>,
}

impl PgCategoryRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepo for PgCategoryRepo {
    async fn upsert_many(&self, categories: &[NewCategory]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for category in categories {
            sqlx::query(
                "INSERT INTO categories (name, description) VALUES ($1, $2) \
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(&category.name)
            .bind(&category.description)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn name_to_id(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query("SELECT id, name FROM categories")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("name"), r.get::<i64, _>("id")))
            .collect())
    }
}
