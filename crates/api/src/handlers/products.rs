//! Product view tracking, hot ranking, and vector similarity endpoints.
//!
//! ## Endpoints
//!
//! - GET /products/{id} - Product details
//! - POST /products/{id}/view - Record a product view (weighted)
//! - GET /products/hot?date=2025-06-01&top=10 - Daily hot-products ranking
//! - GET /products/{id}/similar?limit=5 - Products near this one in vector space
//! - GET /products/similar?q=...&limit=5 - Products near an arbitrary query text

use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use garde::Validate;
use serde::Deserialize;
use shared::api::{HotProductEntry, RecordViewPayload};

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hot", get(hot_products))
        .route("/similar", get(similar_by_text))
        .route("/{product_id}", get(get_product))
        .route("/{product_id}/view", post(record_view))
        .route("/{product_id}/similar", get(similar_to_product))
}

#[debug_handler]
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .repos
        .products
        .find_by_id(product_id)
        .await?
        .ok_or(AppError::External(StatusCode::NOT_FOUND, "Product not found"))?;
    Ok(Json(product))
}

#[debug_handler]
async fn record_view(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(payload): Json<RecordViewPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .stores
        .hot_products
        .record_view(&product_id, payload.score as f64)
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
struct HotParams {
    date: Option<NaiveDate>,
    top: Option<usize>,
}

#[debug_handler]
async fn hot_products(
    State(state): State<AppState>,
    Query(params): Query<HotParams>,
) -> Result<impl IntoResponse, AppError> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    let top = params.top.unwrap_or(10);

    let ranking = state.stores.hot_products.top(date, top).await?;
    let entries: Vec<HotProductEntry> = ranking
        .into_iter()
        .map(|(product_id, score)| HotProductEntry { product_id, score })
        .collect();
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
struct SimilarParams {
    limit: Option<i64>,
}

#[debug_handler]
async fn similar_to_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(params): Query<SimilarParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(5).clamp(1, 50);

    let similar = state
        .repos
        .embeddings
        .similar_to_product(product_id, limit)
        .await?;
    Ok(Json(similar))
}

#[derive(Debug, Deserialize)]
struct SimilarByTextParams {
    q: String,
    limit: Option<i64>,
}

#[debug_handler]
async fn similar_by_text(
    State(state): State<AppState>,
    Query(params): Query<SimilarByTextParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.q.trim().is_empty() {
        return Err(AppError::Validation("q must not be empty".to_string()));
    }
    let limit = params.limit.unwrap_or(5).clamp(1, 50);

    let vector = state.embedding.embed(&params.q).await?;
    let similar = state.repos.embeddings.similar_by_vector(&vector, limit).await?;
    Ok(Json(similar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    use crate::models::SimilarProduct;
    use crate::repos::MockEmbeddingRepo;
    use crate::services::{MockEmbeddingProvider, EMBEDDING_DIM};
    use crate::stores::MockHotProductsStore;
    use crate::test_utils::TestStateBuilder;

    #[tokio::test]
    async fn get_product_returns_404_when_missing() {
        let mut products = crate::repos::MockProductRepo::new();
        products.expect_find_by_id().returning(|_| Ok(None));

        let state = TestStateBuilder::new().with_product_repo(products).build();

        let result = get_product(State(state), Path(99)).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("expected external error");
        };
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_product_returns_the_row() {
        let mut products = crate::repos::MockProductRepo::new();
        products.expect_find_by_id().with(eq(7)).returning(|_| {
            Ok(Some(crate::models::Product {
                id: 7,
                category_id: 2,
                seller_id: 1,
                name: "Moka Pot".to_string(),
                description: Some("Stovetop espresso maker".to_string()),
                price_cents: 2_999,
            }))
        });

        let state = TestStateBuilder::new().with_product_repo(products).build();

        let result = get_product(State(state), Path(7)).await.unwrap();
        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn record_view_feeds_the_daily_ranking() {
        let mut hot = MockHotProductsStore::new();
        hot.expect_record_view()
            .with(eq("P1"), eq(3.0))
            .times(1)
            .returning(|_, _| Ok(()));

        let state = TestStateBuilder::new().with_hot_products_store(hot).build();

        let result = record_view(
            State(state),
            Path("P1".to_string()),
            Json(RecordViewPayload { score: 3 }),
        )
        .await
        .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn hot_products_defaults_to_top_ten_today() {
        let mut hot = MockHotProductsStore::new();
        hot.expect_top()
            .withf(|date, top| *date == Local::now().date_naive() && *top == 10)
            .returning(|_, _| Ok(vec![("P2".to_string(), 3.0), ("P1".to_string(), 1.0)]));

        let state = TestStateBuilder::new().with_hot_products_store(hot).build();

        let result = hot_products(
            State(state),
            Query(HotParams {
                date: None,
                top: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn similar_by_text_embeds_then_queries() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .with(eq("camp stove"))
            .times(1)
            .returning(|_| Ok(vec![0.1; EMBEDDING_DIM]));

        let mut embeddings = MockEmbeddingRepo::new();
        embeddings
            .expect_similar_by_vector()
            .withf(|vector, limit| vector.len() == EMBEDDING_DIM && *limit == 5)
            .times(1)
            .returning(|_, _| {
                Ok(vec![SimilarProduct {
                    id: 9,
                    name: "Camp Stove".to_string(),
                    price_cents: 4_999,
                    score: 0.93,
                }])
            });

        let state = TestStateBuilder::new()
            .with_embedding_provider(provider)
            .with_embedding_repo(embeddings)
            .build();

        let result = similar_by_text(
            State(state),
            Query(SimilarByTextParams {
                q: "camp stove".to_string(),
                limit: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }
}
