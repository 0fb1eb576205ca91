//! User and seller repository for PostgreSQL.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

/// A user row to load. Conflicts on email are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub join_date: NaiveDate,
}

/// A seller account tied to an existing user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeller {
    pub user_id: i64,
    pub rating: Option<f32>,
}

/// Repository for user operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Health check - verify database connectivity.
    async fn ping(&self) -> Result<bool>;

    /// All users as (id, join_date) reference pairs.
    async fn join_dates(&self) -> Result<Vec<(i64, NaiveDate)>>;

    /// Insert users, skipping rows whose email already exists.
    async fn insert_many(&self, users: &[NewUser]) -> Result<()>;

    /// Map of email → user id across all users.
    async fn ids_by_email(&self) -> Result<HashMap<String, i64>>;

    /// Insert seller accounts, skipping existing user_ids.
    async fn insert_sellers(&self, sellers: &[NewSeller]) -> Result<()>;

    /// Map of the seller's user email → seller id.
    async fn seller_ids_by_email(&self) -> Result<HashMap<String, i64>>;
}

/// PostgreSQL implementation of UserRepo.
#[derive(Clone)]
pub struct PgUserRepo {
    pool: Pool<Postgres>,
}

impl PgUserRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn ping(&self) -> Result<bool> {
        let one = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(one == 1)
    }

    async fn join_dates(&self) -> Result<Vec<(i64, NaiveDate)>> {
        let rows = sqlx::query_as::<_, (i64, NaiveDate)>("SELECT id, join_date FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_many(&self, users: &[NewUser]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for user in users {
            sqlx::query(
                "INSERT INTO users (email, full_name, join_date) VALUES ($1, $2, $3) \
                 ON CONFLICT (email) DO NOTHING",
            )
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(user.join_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn ids_by_email(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query("SELECT id, email FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("email"), r.get::<i64, _>("id")))
            .collect())
    }

    async fn insert_sellers(&self, sellers: &[NewSeller]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for seller in sellers {
            sqlx::query(
                "INSERT INTO sellers (user_id, rating) VALUES ($1, $2) \
                 ON CONFLICT (user_id) DO NOTHING",
            )
            .bind(seller.user_id)
            .bind(seller.rating)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn seller_ids_by_email(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query("SELECT s.id, u.email FROM sellers s JOIN users u ON u.id = s.user_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("email"), r.get::<i64, _>("id")))
            .collect())
    }
}
