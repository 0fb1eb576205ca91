//! Synthetic purchase generation across Postgres and Neo4j.
//!
//! Each generated order lands twice: as an order/order-items pair in the
//! relational store and as PURCHASED edges in the graph. The relational batch
//! commits first; a failure there leaves the graph untouched. Re-running is
//! idempotent at the edge level (quantities accumulate on the same
//! user→product edge) but not at the order level (every run mints fresh
//! order ids). That asymmetry is inherited behavior, kept on purpose.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::codes::id_code;
use crate::models::{Order, ProductRef, PurchaseEdge, UserPreferences};
use crate::repos::{CategoryRepo, NewOrderItem, OrderRepo, ProductRepo, UserRepo};
use crate::services::{GraphStore, PreferenceStore};

/// Probability that a single product pick is drawn from the user's liked
/// categories instead of the full catalog.
const LIKED_POOL_BIAS: f64 = 0.6;

/// One generated batch, ready to persist.
#[derive(Debug, Default)]
struct Batch {
    orders: Vec<Order>,
    items: Vec<NewOrderItem>,
    edges: Vec<PurchaseEdge>,
}

/// Coordinates reference loads, generation, and the two-store write.
pub struct PurchaseGenerator {
    users: Arc<dyn UserRepo>,
    categories: Arc<dyn CategoryRepo>,
    products: Arc<dyn ProductRepo>,
    orders: Arc<dyn OrderRepo>,
    preferences: Arc<dyn PreferenceStore>,
    graph: Arc<dyn GraphStore>,
}

impl PurchaseGenerator {
    pub fn new(
        users: Arc<dyn UserRepo>,
        categories: Arc<dyn CategoryRepo>,
        products: Arc<dyn ProductRepo>,
        orders: Arc<dyn OrderRepo>,
        preferences: Arc<dyn PreferenceStore>,
        graph: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            users,
            categories,
            products,
            orders,
            preferences,
            graph,
        }
    }

    /// Generate `total` purchases and write them to both stores.
    /// Returns the number of orders created.
    pub async fn run(&self, total: usize, seed: u64) -> Result<usize> {
        tracing::info!("loading reference data");
        let users = self
            .users
            .join_dates()
            .await
            .context("loading users failed")?;
        ensure!(!users.is_empty(), "no users to generate purchases for");

        let products = self
            .products
            .refs()
            .await
            .context("loading products failed")?;
        ensure!(!products.is_empty(), "no products to generate purchases for");

        let name_to_id = self
            .categories
            .name_to_id()
            .await
            .context("loading categories failed")?;
        let preferences = self
            .preferences
            .all_preferences()
            .await
            .context("loading user preferences failed")?;
        let liked = liked_ids_by_user(&preferences, &name_to_id);

        let next_order_id = self.orders.max_id().await? + 1;

        tracing::info!(total, seed, "generating purchases");
        let mut rng = StdRng::seed_from_u64(seed);
        let batch = generate(
            &mut rng,
            &users,
            &products,
            &liked,
            next_order_id,
            Local::now().date_naive(),
            total,
        );

        // Relational write commits first; if it fails the graph sees nothing,
        // so a retry cannot double-count edges from a half-finished run.
        tracing::info!(orders = batch.orders.len(), "inserting orders into Postgres");
        self.orders.insert_batch(&batch.orders, &batch.items).await?;

        tracing::info!(edges = batch.edges.len(), "upserting PURCHASED edges into Neo4j");
        self.graph.upsert_purchases(&batch.edges).await?;

        Ok(batch.orders.len())
    }
}

/// Resolve each user's liked category names to ids. Unknown names are
/// skipped: an unmappable preference never invents a category.
fn liked_ids_by_user(
    preferences: &[UserPreferences],
    name_to_id: &HashMap<String, i64>,
) -> HashMap<i64, Vec<i64>> {
    let mut liked = HashMap::new();
    for pref in preferences {
        let Ok(user_id) = id_code(&pref.user_id) else {
            tracing::warn!(user = %pref.user_id, "skipping preference with unparseable user id");
            continue;
        };
        let ids: Vec<i64> = pref
            .liked_categories
            .iter()
            .filter_map(|name| name_to_id.get(name).copied())
            .collect();
        liked.insert(user_id, ids);
    }
    liked
}

fn rand_date(rng: &mut StdRng, join: NaiveDate, today: NaiveDate) -> NaiveDate {
    let span = (today - join).num_days();
    if span <= 0 {
        return join;
    }
    join + Duration::days(rng.gen_range(0..=span))
}

fn generate(
    rng: &mut StdRng,
    users: &[(i64, NaiveDate)],
    products: &[ProductRef],
    liked: &HashMap<i64, Vec<i64>>,
    next_order_id: i64,
    today: NaiveDate,
    total: usize,
) -> Batch {
    let mut batch = Batch::default();
    let mut order_id = next_order_id;

    for _ in 0..total {
        let (user_id, join_date) = users[rng.gen_range(0..users.len())];
        let liked_ids = liked.get(&user_id).map(Vec::as_slice).unwrap_or(&[]);
        let date = rand_date(rng, join_date, today);

        let liked_pool: Vec<ProductRef> = products
            .iter()
            .filter(|p| liked_ids.contains(&p.category_id))
            .copied()
            .collect();

        let mut picked: HashSet<i64> = HashSet::new();
        let mut in_liked = false;

        let mut push_pick = |batch: &mut Batch, rng: &mut StdRng, product: ProductRef| {
            let quantity = rng.gen_range(1..=3);
            batch.items.push(NewOrderItem {
                order_id,
                product_id: product.id,
                quantity,
                price_cents: product.price_cents,
            });
            batch.edges.push(PurchaseEdge {
                user_id,
                product_id: product.id,
                quantity,
                date,
            });
        };

        for _ in 0..rng.gen_range(1..=3) {
            let pool = if !liked_pool.is_empty() && rng.gen_bool(LIKED_POOL_BIAS) {
                liked_pool.as_slice()
            } else {
                products
            };
            let product = pool[rng.gen_range(0..pool.len())];
            if !picked.insert(product.id) {
                // Duplicate roll: dropped, not retried, so orders may carry
                // fewer items than the rolled count.
                continue;
            }
            if liked_ids.contains(&product.category_id) {
                in_liked = true;
            }
            push_pick(&mut batch, rng, product);
        }

        // Users with declared interests get at least one matching item.
        if !liked_pool.is_empty() && !in_liked {
            let product = liked_pool[rng.gen_range(0..liked_pool.len())];
            if picked.insert(product.id) {
                push_pick(&mut batch, rng, product);
            }
        }

        batch.orders.push(Order {
            id: order_id,
            user_id,
            created_at: date,
        });
        order_id += 1;
    }

    batch
}
