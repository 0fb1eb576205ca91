//! Document store access (MongoDB).

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Database, IndexModel,
};

use crate::models::UserPreferences;

/// Store for document collections (reviews, specs, seller profiles, user
/// preferences). The core only ever reads `user_preferences`; the rest is
/// loaded and served as-is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Health check - verify MongoDB connectivity.
    async fn ping(&self) -> Result<bool>;

    /// Create the declared indexes (idempotent).
    async fn ensure_indexes(&self) -> Result<()>;

    /// Bulk-insert raw documents into a collection. Returns the count inserted.
    async fn insert_docs(&self, collection: &str, docs: Vec<Document>) -> Result<u64>;

    /// Every user_preferences document.
    async fn all_preferences(&self) -> Result<Vec<UserPreferences>>;
}

/// MongoDB implementation of PreferenceStore.
#[derive(Clone)]
pub struct MongoPreferenceStore {
    db: Database,
}

impl MongoPreferenceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn index(&self, collection: &str, keys: Document, unique: bool) -> Result<()> {
        let model = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(unique).build())
            .build();
        self.db
            .collection::<Document>(collection)
            .create_index(model)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for MongoPreferenceStore {
    async fn ping(&self) -> Result<bool> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(true)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        self.index("reviews", doc! { "product_id": 1 }, false).await?;
        self.index("reviews", doc! { "user_id": 1 }, false).await?;
        self.index("reviews", doc! { "rating": -1, "created_at": -1 }, false)
            .await?;
        self.index("product_specs", doc! { "product_id": 1 }, true).await?;
        self.index("seller_profiles", doc! { "seller_id": 1 }, true).await?;
        self.index("user_preferences", doc! { "user_id": 1 }, true).await?;
        Ok(())
    }

    async fn insert_docs(&self, collection: &str, docs: Vec<Document>) -> Result<u64> {
        if docs.is_empty() {
            return Ok(0);
        }
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_many(docs)
            .await?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn all_preferences(&self) -> Result<Vec<UserPreferences>> {
        let cursor = self
            .db
            .collection::<UserPreferences>("user_preferences")
            .find(doc! {})
            .await?;
        let prefs: Vec<UserPreferences> = cursor.try_collect().await?;
        Ok(prefs)
    }
}
