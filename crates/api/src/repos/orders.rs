//! Order repository for PostgreSQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::Order;

/// An order line to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price_cents: i64,
}

/// Repository for order operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepo: Send + Sync {
    /// Highest existing order id, 0 when the table is empty.
    async fn max_id(&self) -> Result<i64>;

    /// Write a generated batch of orders and their items in one transaction.
    /// Ids are assigned by the caller; a failure rolls back the whole batch.
    async fn insert_batch(&self, orders: &[Order], items: &[NewOrderItem]) -> Result<()>;

    /// Load orders and items from reference data, skipping existing rows.
    async fn load(&self, orders: &[Order], items: &[NewOrderItem]) -> Result<()>;

    /// Create a single order for a user, pricing each item from the products
    /// table. Returns the new order id.
    async fn create(&self, user_id: i64, items: &[(i64, i64)]) -> Result<i64>;
}

/// PostgreSQL implementation of OrderRepo.
#[derive(Clone)]
pub struct PgOrderRepo {
    pool: Pool<Postgres>,
}

impl PgOrderRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepo for PgOrderRepo {
    async fn max_id(&self) -> Result<i64> {
        let max = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    async fn insert_batch(&self, orders: &[Order], items: &[NewOrderItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for order in orders {
            sqlx::query("INSERT INTO orders (id, user_id, created_at) VALUES ($1, $2, $3)")
                .bind(order.id)
                .bind(order.user_id)
                .bind(order.created_at)
                .execute(&mut *tx)
                .await?;
        }
        for item in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price_cents) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn load(&self, orders: &[Order], items: &[NewOrderItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for order in orders {
            sqlx::query(
                "INSERT INTO orders (id, user_id, created_at) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(order.id)
            .bind(order.user_id)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;
        }
        for item in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price_cents) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn create(&self, user_id: i64, items: &[(i64, i64)]) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        for (product_id, quantity) in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price_cents) \
                 SELECT $1, id, $3, price_cents FROM products WHERE id = $2",
            )
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }
}
