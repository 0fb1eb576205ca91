//! Embedding providers: text → fixed-length normalized vector.

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Every provider returns vectors of exactly this many dimensions.
pub const EMBEDDING_DIM: usize = 384;

/// Black-box text embedding. The model behind it is not this crate's concern;
/// callers only rely on the output being `EMBEDDING_DIM` floats, normalized.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a str,
}

/// HTTP-backed provider, compatible with text-embeddings-inference-style
/// servers: POST {"inputs": text} → [[f32; 384]].
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    http: reqwest::Client,
    url: String,
}

impl HttpEmbeddingProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .http
            .post(&self.url)
            .json(&EmbedRequest { inputs: text })
            .send()
            .await
            .context("embedding request failed")?
            .error_for_status()
            .context("embedding service returned an error")?;

        let mut rows: Vec<Vec<f32>> = response
            .json()
            .await
            .context("malformed embedding response")?;
        let vector = rows
            .pop()
            .context("embedding response contained no vectors")?;
        ensure!(
            vector.len() == EMBEDDING_DIM,
            "expected {} dimensions, got {}",
            EMBEDDING_DIM,
            vector.len()
        );
        Ok(vector)
    }
}

/// Deterministic provider for tests and offline loads: the vector is a
/// function of (seed, text) only, unit-normalized like the real model's
/// output.
#[derive(Clone)]
pub struct SimEmbeddingProvider {
    seed: u64,
}

impl SimEmbeddingProvider {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl EmbeddingProvider for SimEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.seed.hash(&mut hasher);
        text.hash(&mut hasher);
        let mut rng = rand::rngs::StdRng::seed_from_u64(hasher.finish());

        let mut vector: Vec<f32> = (0..EMBEDDING_DIM).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}
