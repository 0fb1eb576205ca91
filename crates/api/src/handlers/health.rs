//! Health check endpoint for load balancers and monitoring.
//!
//! Returns 200 OK if every backing store is reachable,
//! 503 Service Unavailable otherwise.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    postgres: bool,
    redis: bool,
    mongodb: bool,
    neo4j: bool,
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let postgres = matches!(state.repos.users.ping().await, Ok(true));
    let redis = matches!(state.stores.cache.ping().await, Ok(true));
    let mongodb = matches!(state.preferences.ping().await, Ok(true));
    let neo4j = matches!(state.graph.ping().await, Ok(true));

    let healthy = postgres && redis && mongodb && neo4j;

    let response = HealthResponse {
        status: if healthy { "ok" } else { "unhealthy" },
        postgres,
        redis,
        mongodb,
        neo4j,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
