//! Shopping cart endpoints.
//!
//! Carts live entirely in Redis and expire after a period of inactivity;
//! every mutation refreshes the TTL. All cart routes count against the
//! caller's fixed-window rate limit for the "cart" endpoint.
//!
//! ## Endpoints
//!
//! - POST /cart/{user_id}/items - Add quantity to a cart line
//! - PUT /cart/{user_id}/items/{product_id} - Set a line's quantity (<= 0 removes)
//! - GET /cart/{user_id} - Full cart contents
//! - DELETE /cart/{user_id} - Drop the cart immediately

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use garde::Validate;
use shared::api::{AddToCartPayload, CartResponse, UpdateCartPayload};

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/items", post(add_item))
        .route("/{user_id}/items/{product_id}", put(update_item))
        .route("/{user_id}", get(get_cart).delete(clear_cart))
}

async fn check_rate_limit(state: &AppState, user_id: &str) -> Result<(), AppError> {
    let result = state.stores.rate_limiter.check(user_id, "cart").await?;
    if !result.is_allowed() {
        return Err(AppError::rate_limited());
    }
    Ok(())
}

#[debug_handler]
async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<AddToCartPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    check_rate_limit(&state, &user_id).await?;

    state
        .stores
        .cart
        .add(&user_id, &payload.product_id, payload.qty)
        .await?;

    tracing::debug!(user_id, product_id = %payload.product_id, qty = payload.qty, "cart add");
    Ok(StatusCode::OK)
}

#[debug_handler]
async fn update_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(String, String)>,
    Json(payload): Json<UpdateCartPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    check_rate_limit(&state, &user_id).await?;

    state
        .stores
        .cart
        .update(&user_id, &product_id, payload.qty)
        .await?;

    Ok(StatusCode::OK)
}

#[debug_handler]
async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_rate_limit(&state, &user_id).await?;

    let items = state.stores.cart.get(&user_id).await?;
    Ok(Json(CartResponse { items }))
}

#[debug_handler]
async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_rate_limit(&state, &user_id).await?;

    state.stores.cart.clear(&user_id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use std::collections::HashMap;

    use crate::stores::{MockCartStore, MockRateLimiter, RateLimitResult};
    use crate::test_utils::TestStateBuilder;

    fn permissive_limiter() -> MockRateLimiter {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check()
            .returning(|_, _| Ok(RateLimitResult::Allowed(1)));
        limiter
    }

    #[tokio::test]
    async fn add_item_increments_the_cart_line() {
        let mut cart = MockCartStore::new();
        cart.expect_add()
            .with(eq("U1"), eq("P1"), eq(2))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let state = TestStateBuilder::new()
            .with_cart_store(cart)
            .with_rate_limiter(permissive_limiter())
            .build();

        let payload = AddToCartPayload {
            product_id: "P1".to_string(),
            qty: 2,
        };
        let result = add_item(State(state), Path("U1".to_string()), Json(payload))
            .await
            .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn repeated_adds_accumulate_per_product() {
        use std::sync::{Arc, Mutex};

        // Stateful double with the store's increment semantics, so the full
        // add/add/add/get flow can run through the handlers.
        let lines: Arc<Mutex<HashMap<String, i64>>> = Arc::new(Mutex::new(HashMap::new()));

        let mut cart = MockCartStore::new();
        let write = lines.clone();
        cart.expect_add().returning(move |_, product_id, qty| {
            *write.lock().unwrap().entry(product_id.to_string()).or_insert(0) += qty;
            Ok(())
        });
        let read = lines.clone();
        cart.expect_get().returning(move |_| Ok(read.lock().unwrap().clone()));

        let state = TestStateBuilder::new()
            .with_cart_store(cart)
            .with_rate_limiter(permissive_limiter())
            .build();

        for (product_id, qty) in [("P1", 2), ("P1", 1), ("P2", 4)] {
            let payload = AddToCartPayload {
                product_id: product_id.to_string(),
                qty,
            };
            add_item(State(state.clone()), Path("U1".to_string()), Json(payload))
                .await
                .unwrap();
        }

        assert_eq!(
            *lines.lock().unwrap(),
            HashMap::from([("P1".to_string(), 3), ("P2".to_string(), 4)])
        );
    }

    #[tokio::test]
    async fn add_item_rejects_invalid_qty() {
        let state = TestStateBuilder::new().build();

        let payload = AddToCartPayload {
            product_id: "P1".to_string(),
            qty: 0,
        };
        let result = add_item(State(state), Path("U1".to_string()), Json(payload)).await;

        let Err(AppError::Validation(_)) = result else {
            panic!("expected validation error");
        };
    }

    #[tokio::test]
    async fn rate_limited_user_gets_429() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check()
            .with(eq("U1"), eq("cart"))
            .returning(|_, _| Ok(RateLimitResult::Exceeded(31)));

        // No cart expectations: the store must not be touched.
        let state = TestStateBuilder::new()
            .with_rate_limiter(limiter)
            .build();

        let result = get_cart(State(state), Path("U1".to_string())).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("expected external error");
        };
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn update_item_passes_removal_quantities_through() {
        let mut cart = MockCartStore::new();
        cart.expect_update()
            .with(eq("U1"), eq("P1"), eq(0))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let state = TestStateBuilder::new()
            .with_cart_store(cart)
            .with_rate_limiter(permissive_limiter())
            .build();

        let result = update_item(
            State(state),
            Path(("U1".to_string(), "P1".to_string())),
            Json(UpdateCartPayload { qty: 0 }),
        )
        .await
        .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_cart_returns_contents() {
        let mut cart = MockCartStore::new();
        cart.expect_get()
            .with(eq("U1"))
            .returning(|_| Ok(HashMap::from([("P1".to_string(), 3)])));

        let state = TestStateBuilder::new()
            .with_cart_store(cart)
            .with_rate_limiter(permissive_limiter())
            .build();

        let result = get_cart(State(state), Path("U1".to_string())).await.unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn clear_cart_deletes_immediately() {
        let mut cart = MockCartStore::new();
        cart.expect_clear()
            .with(eq("U1"))
            .times(1)
            .returning(|_| Ok(()));

        let state = TestStateBuilder::new()
            .with_cart_store(cart)
            .with_rate_limiter(permissive_limiter())
            .build();

        let result = clear_cart(State(state), Path("U1".to_string())).await.unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }
}
