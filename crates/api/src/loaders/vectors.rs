//! Product description → pgvector loader.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::codes::id_code;
use crate::repos::EmbeddingRepo;
use crate::services::EmbeddingProvider;

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: String,
    #[serde(default)]
    description: Option<String>,
}

/// Embed every product description and upsert the vectors. Products without
/// a description are embedded from the empty string, matching whatever the
/// model does with it.
pub async fn run(
    data_dir: &Path,
    provider: &dyn EmbeddingProvider,
    embeddings: &dyn EmbeddingRepo,
) -> Result<()> {
    let path = data_dir.join("products.csv");
    let mut reader =
        csv::Reader::from_path(&path).with_context(|| format!("opening {}", path.display()))?;
    let records: Vec<ProductRecord> = reader
        .deserialize()
        .collect::<Result<_, csv::Error>>()
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut count = 0usize;
    for record in &records {
        let product_id = id_code(&record.id)?;
        let text = record.description.as_deref().unwrap_or("");
        let vector = provider.embed(text).await?;
        embeddings.upsert(product_id, &vector).await?;
        count += 1;
    }

    tracing::info!(count, "vector load complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::repos::MockEmbeddingRepo;
    use crate::services::{MockEmbeddingProvider, EMBEDDING_DIM};

    #[tokio::test]
    async fn embeds_and_upserts_each_product() {
        let dir = std::env::temp_dir().join("vector_loader_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("products.csv"),
            "id,category,seller_id,name,description,price\n\
             P01,Kitchen,S01,Moka Pot,Stovetop espresso maker,29.99\n\
             P02,Kitchen,S01,French Press,,19.99\n",
        )
        .unwrap();

        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .times(2)
            .returning(|_| Ok(vec![0.0; EMBEDDING_DIM]));

        let mut repo = MockEmbeddingRepo::new();
        repo.expect_upsert()
            .withf(|id, vector| (*id == 1 || *id == 2) && vector.len() == EMBEDDING_DIM)
            .times(2)
            .returning(|_, _| Ok(()));

        let provider: Arc<dyn EmbeddingProvider> = Arc::new(provider);
        let repo: Arc<dyn EmbeddingRepo> = Arc::new(repo);
        run(&dir, provider.as_ref(), repo.as_ref()).await.unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }
}
