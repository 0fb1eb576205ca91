//! Order creation endpoint.
//!
//! Orders land in Postgres only; the co-purchase graph is fed by the batch
//! generator, not by this path.
//!
//! ## Endpoints
//!
//! - POST /orders - Create an order, pricing items from the products table

use axum::{
    debug_handler, extract::State, http::StatusCode, response::IntoResponse, routing::post, Json,
    Router,
};
use garde::Validate;
use shared::api::{CreateOrderPayload, CreateOrderResponse};

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_order))
}

#[debug_handler]
async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let items: Vec<(i64, i64)> = payload
        .items
        .iter()
        .map(|item| (item.product_id, item.qty))
        .collect();

    let order_id = state.repos.orders.create(payload.user_id, &items).await?;

    tracing::info!(order_id, user_id = payload.user_id, lines = items.len(), "order created");
    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse { order_id }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::api::OrderItemPayload;

    use crate::repos::MockOrderRepo;
    use crate::test_utils::TestStateBuilder;

    #[tokio::test]
    async fn create_order_returns_the_new_id() {
        let mut orders = MockOrderRepo::new();
        orders
            .expect_create()
            .withf(|user_id, items| *user_id == 3 && items == [(12, 2), (15, 1)])
            .times(1)
            .returning(|_, _| Ok(101));

        let state = TestStateBuilder::new().with_order_repo(orders).build();

        let payload = CreateOrderPayload {
            user_id: 3,
            items: vec![
                OrderItemPayload {
                    product_id: 12,
                    qty: 2,
                },
                OrderItemPayload {
                    product_id: 15,
                    qty: 1,
                },
            ],
        };

        let result = create_order(State(state), Json(payload)).await.unwrap();
        assert_eq!(result.into_response().status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_order_rejects_empty_item_list() {
        let state = TestStateBuilder::new().build();

        let payload = CreateOrderPayload {
            user_id: 3,
            items: vec![],
        };
        let result = create_order(State(state), Json(payload)).await;

        let Err(AppError::Validation(_)) = result else {
            panic!("expected validation error");
        };
    }
}
