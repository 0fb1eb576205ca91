//! Graph-backed recommendation endpoints.
//!
//! Pass-through Cypher queries over the co-purchase graph.
//!
//! ## Endpoints
//!
//! - GET /recommendations/also-bought/{product_id}
//! - GET /recommendations/together/{product_id}
//! - GET /recommendations/personalized/{user_id}

use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/also-bought/{product_id}", get(also_bought))
        .route("/together/{product_id}", get(together))
        .route("/personalized/{user_id}", get(personalized))
}

#[derive(Debug, Deserialize)]
struct RecParams {
    limit: Option<i64>,
}

fn limit_of(params: &RecParams) -> i64 {
    params.limit.unwrap_or(5).clamp(1, 50)
}

#[debug_handler]
async fn also_bought(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(params): Query<RecParams>,
) -> Result<impl IntoResponse, AppError> {
    let recs = state.graph.also_bought(product_id, limit_of(&params)).await?;
    Ok(Json(recs))
}

#[debug_handler]
async fn together(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(params): Query<RecParams>,
) -> Result<impl IntoResponse, AppError> {
    let recs = state
        .graph
        .frequently_bought_together(product_id, limit_of(&params))
        .await?;
    Ok(Json(recs))
}

#[debug_handler]
async fn personalized(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<RecParams>,
) -> Result<impl IntoResponse, AppError> {
    let recs = state.graph.personalized(user_id, limit_of(&params)).await?;
    Ok(Json(recs))
}
