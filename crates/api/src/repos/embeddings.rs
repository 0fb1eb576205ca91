//! Product embedding repository for PostgreSQL + pgvector.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::SimilarProduct;

/// Render an embedding in pgvector's text format for a `$n::vector` cast.
fn vector_literal(embedding: &[f32]) -> String {
    let parts: Vec<String> = embedding.iter().map(|f| f.to_string()).collect();
    format!("[{}]", parts.join(","))
}

/// Repository for vector-similarity operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingRepo: Send + Sync {
    /// Insert or refresh a product's embedding.
    async fn upsert(&self, product_id: i64, embedding: &[f32]) -> Result<()>;

    /// Products nearest to an arbitrary query vector.
    async fn similar_by_vector(&self, embedding: &[f32], limit: i64)
        -> Result<Vec<SimilarProduct>>;

    /// Products nearest to an existing product's embedding, excluding itself.
    async fn similar_to_product(&self, product_id: i64, limit: i64)
        -> Result<Vec<SimilarProduct>>;
}

/// PostgreSQL implementation of EmbeddingRepo.
#[derive(Clone)]
pub struct PgEmbeddingRepo {
    pool: Pool<Postgres>,
}

impl PgEmbeddingRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmbeddingRepo for PgEmbeddingRepo {
    async fn upsert(&self, product_id: i64, embedding: &[f32]) -> Result<()> {
        sqlx::query(
            "INSERT INTO product_embeddings (product_id, embedding) VALUES ($1, $2::vector) \
             ON CONFLICT (product_id) DO UPDATE SET embedding = EXCLUDED.embedding",
        )
        .bind(product_id)
        .bind(vector_literal(embedding))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn similar_by_vector(
        &self,
        embedding: &[f32],
        limit: i64,
    ) -> Result<Vec<SimilarProduct>> {
        // Embeddings are normalized, so inner product (<#>) orders by cosine
        // similarity; 1 - distance keeps higher = more similar.
        let rows = sqlx::query_as::<_, SimilarProduct>(
            "SELECT p.id, p.name, p.price_cents, \
                    1 - (e.embedding <#> $1::vector) AS score \
             FROM product_embeddings e \
             JOIN products p ON p.id = e.product_id \
             ORDER BY e.embedding <#> $1::vector \
             LIMIT $2",
        )
        .bind(vector_literal(embedding))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn similar_to_product(
        &self,
        product_id: i64,
        limit: i64,
    ) -> Result<Vec<SimilarProduct>> {
        let rows = sqlx::query_as::<_, SimilarProduct>(
            "WITH src AS ( \
                 SELECT embedding FROM product_embeddings WHERE product_id = $1 \
             ) \
             SELECT p.id, p.name, p.price_cents, \
                    1 - (e.embedding <#> src.embedding) AS score \
             FROM product_embeddings e \
             JOIN products p ON p.id = e.product_id \
             CROSS JOIN src \
             WHERE e.product_id <> $1 \
             ORDER BY e.embedding <#> src.embedding \
             LIMIT $2",
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
