//! API request/response types shared between the server and its consumers.

use std::collections::HashMap;

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Max quantity accepted per cart line. Keeps synthetic traffic honest.
const MAX_LINE_QTY: i64 = 999;

/// Add a product to a cart (increments any existing quantity).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddToCartPayload {
    #[garde(length(min = 1))]
    pub product_id: String,
    /// Quantity delta to add.
    #[garde(range(min = 1, max = MAX_LINE_QTY))]
    #[serde(default = "default_qty")]
    pub qty: i64,
}

fn default_qty() -> i64 {
    1
}

/// Set a cart line to an absolute quantity. Zero or negative removes the line.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateCartPayload {
    #[garde(range(max = MAX_LINE_QTY))]
    pub qty: i64,
}

/// Full cart contents for a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: HashMap<String, i64>,
}

/// Record a product view with an optional weight.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecordViewPayload {
    #[garde(range(min = 1))]
    #[serde(default = "default_qty")]
    pub score: i64,
}

/// One entry in the hot-products ranking.
#[derive(Debug, Serialize, Deserialize)]
pub struct HotProductEntry {
    pub product_id: String,
    pub score: f64,
}

/// Search cache hit/miss counters.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchStatsResponse {
    pub hits: i64,
    pub misses: i64,
}

/// One line of an order to create.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItemPayload {
    #[garde(range(min = 1))]
    pub product_id: i64,
    #[garde(range(min = 1, max = MAX_LINE_QTY))]
    pub qty: i64,
}

/// Create an order for a user. Prices are resolved server-side.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderPayload {
    #[garde(range(min = 1))]
    pub user_id: i64,
    #[garde(length(min = 1), dive)]
    pub items: Vec<OrderItemPayload>,
}

/// Returned after an order is created.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_cart_defaults_qty_to_one() {
        let payload: AddToCartPayload = serde_json::from_str(r#"{"product_id":"P1"}"#).unwrap();
        assert_eq!(payload.qty, 1);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn add_to_cart_rejects_zero_qty() {
        let payload = AddToCartPayload {
            product_id: "P1".to_string(),
            qty: 0,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn update_cart_allows_negative_qty() {
        // Negative quantity is a removal request, not a validation error.
        let payload = UpdateCartPayload { qty: -1 };
        assert!(payload.validate().is_ok());
    }
}
