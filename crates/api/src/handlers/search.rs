//! Full-text search endpoints.
//!
//! ## Endpoints
//!
//! - GET /search?q=...&category=3&price_min=100&price_max=5000&limit=20
//! - GET /search/stats - cache hit/miss counters

use axum::{
    debug_handler,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared::api::SearchStatsResponse;

use crate::{error::AppError, state::AppState};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/stats", get(stats))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
    category: Option<i64>,
    price_min: Option<i64>,
    price_max: Option<i64>,
    limit: Option<i64>,
}

#[debug_handler]
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.q.trim().is_empty() {
        return Err(AppError::Validation("q must not be empty".to_string()));
    }

    let price_range = match (params.price_min, params.price_max) {
        (Some(lo), Some(hi)) if lo <= hi => Some((lo, hi)),
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "price_min must not exceed price_max".to_string(),
            ));
        }
        (None, None) => None,
        _ => {
            return Err(AppError::Validation(
                "price_min and price_max must be given together".to_string(),
            ));
        }
    };

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let hits = state
        .search
        .search(&params.q, params.category, price_range, limit)
        .await?;
    Ok(Json(hits))
}

#[debug_handler]
async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = state.search.stats().await?;
    Ok(Json(SearchStatsResponse {
        hits: stats.hits,
        misses: stats.misses,
    }))
}
