//! JSON → MongoDB loader.

use std::path::Path;

use anyhow::{Context, Result};
use mongodb::bson::Document;

use crate::services::PreferenceStore;

const COLLECTIONS: &[&str] = &["reviews", "product_specs", "seller_profiles", "user_preferences"];

/// Load every document collection from `data_dir` and create the declared
/// indexes. Collections without a source file are skipped.
pub async fn run(data_dir: &Path, store: &dyn PreferenceStore) -> Result<()> {
    store.ensure_indexes().await?;

    for collection in COLLECTIONS {
        let path = data_dir.join(format!("{}.json", collection));
        if !path.exists() {
            tracing::warn!(collection, "no source file, skipping");
            continue;
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let docs: Vec<Document> = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;

        let inserted = store.insert_docs(collection, docs).await?;
        tracing::info!(collection, inserted, "documents loaded");
    }

    tracing::info!("document load complete");
    Ok(())
}
