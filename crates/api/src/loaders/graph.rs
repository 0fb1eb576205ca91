//! CSV → Neo4j loader.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::codes::id_code;
use crate::models::PurchaseEdge;
use crate::services::{GraphProduct, GraphStore, GraphUser};

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: String,
    category: String,
    name: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    name: String,
    join_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    id: String,
    user_id: String,
    created_at: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct OrderItemRecord {
    order_id: String,
    product_id: String,
    quantity: i64,
}

fn read_csv<T: serde::de::DeserializeOwned>(data_dir: &Path, stem: &str) -> Result<Vec<T>> {
    let path = data_dir.join(format!("{}.csv", stem));
    let mut reader =
        csv::Reader::from_path(&path).with_context(|| format!("opening {}", path.display()))?;
    let rows: Result<Vec<T>, csv::Error> = reader.deserialize().collect();
    rows.with_context(|| format!("parsing {}", path.display()))
}

/// Mirror the relational reference data into the graph: constraint setup,
/// Category/Product/User nodes, BELONGS_TO edges, and the PURCHASED edges
/// implied by the seeded orders.
pub async fn run(data_dir: &Path, graph: &dyn GraphStore) -> Result<()> {
    graph.ensure_constraints().await?;

    let categories: Vec<CategoryRecord> = read_csv(data_dir, "categories")?;
    let pairs: Vec<(i64, String)> = categories.into_iter().map(|c| (c.id, c.name)).collect();
    graph.merge_categories(&pairs).await?;
    tracing::info!(count = pairs.len(), "category nodes merged");

    let products: Vec<ProductRecord> = read_csv(data_dir, "products")?;
    let nodes: Vec<GraphProduct> = products
        .into_iter()
        .map(|p| {
            Ok(GraphProduct {
                id: id_code(&p.id)?,
                name: p.name,
                price_cents: (p.price * 100.0).round() as i64,
                category_name: p.category,
            })
        })
        .collect::<Result<_>>()?;
    graph.merge_products(&nodes).await?;
    tracing::info!(count = nodes.len(), "product nodes merged");

    let users: Vec<UserRecord> = read_csv(data_dir, "users")?;
    let nodes: Vec<GraphUser> = users
        .into_iter()
        .map(|u| {
            Ok(GraphUser {
                id: id_code(&u.id)?,
                name: u.name,
                join_date: u.join_date.to_string(),
            })
        })
        .collect::<Result<_>>()?;
    graph.merge_users(&nodes).await?;
    tracing::info!(count = nodes.len(), "user nodes merged");

    let orders: Vec<OrderRecord> = read_csv(data_dir, "orders")?;
    let items: Vec<OrderItemRecord> = read_csv(data_dir, "order_items")?;
    let edges = purchase_edges(&orders, &items)?;
    graph.upsert_purchases(&edges).await?;
    tracing::info!(count = edges.len(), "PURCHASED edges upserted");

    tracing::info!("graph load complete");
    Ok(())
}

/// Join order items to their orders to produce PURCHASED edges. Items whose
/// order is missing from orders.csv are skipped.
fn purchase_edges(
    orders: &[OrderRecord],
    items: &[OrderItemRecord],
) -> Result<Vec<PurchaseEdge>> {
    let mut by_id: HashMap<i64, (i64, NaiveDate)> = HashMap::new();
    for order in orders {
        by_id.insert(id_code(&order.id)?, (id_code(&order.user_id)?, order.created_at));
    }

    let mut edges = Vec::with_capacity(items.len());
    for item in items {
        let order_id = id_code(&item.order_id)?;
        let Some(&(user_id, date)) = by_id.get(&order_id) else {
            tracing::warn!(order = %item.order_id, "skipping item with unknown order");
            continue;
        };
        edges.push(PurchaseEdge {
            user_id,
            product_id: id_code(&item.product_id)?,
            quantity: item.quantity,
            date,
        });
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_edges_join_items_to_their_orders() {
        let orders = vec![OrderRecord {
            id: "O7".to_string(),
            user_id: "U3".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }];
        let items = vec![
            OrderItemRecord {
                order_id: "O7".to_string(),
                product_id: "P12".to_string(),
                quantity: 2,
            },
            OrderItemRecord {
                order_id: "O99".to_string(), // no such order
                product_id: "P13".to_string(),
                quantity: 1,
            },
        ];

        let edges = purchase_edges(&orders, &items).unwrap();

        assert_eq!(
            edges,
            vec![PurchaseEdge {
                user_id: 3,
                product_id: 12,
                quantity: 2,
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            }]
        );
    }
}
