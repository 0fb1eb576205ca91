//! CSV → PostgreSQL loader.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::codes::id_code;
use crate::models::Order;
use crate::repos::{NewCategory, NewOrderItem, NewProduct, NewSeller, NewUser, Repos};

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    email: String,
    name: String,
    join_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct SellerRecord {
    id: String,
    name: String,
    rating: Option<f32>,
    joined: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    category: String,
    seller_id: String,
    name: String,
    description: Option<String>,
    price: f64,
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
    price: f64,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRecord {
    product_id: String,
    /// Vector in pgvector text form, e.g. "[0.1,0.2,...]".
    embedding: String,
}

fn read_csv<T: DeserializeOwned>(data_dir: &Path, stem: &str) -> Result<Vec<T>> {
    let path = data_dir.join(format!("{}.csv", stem));
    let mut reader =
        csv::Reader::from_path(&path).with_context(|| format!("opening {}", path.display()))?;
    let rows: Result<Vec<T>, csv::Error> = reader.deserialize().collect();
    rows.with_context(|| format!("parsing {}", path.display()))
}

fn price_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

fn seller_email(code: &str) -> String {
    format!("{}@seller.local", code.to_lowercase())
}

/// Load every relational table from `data_dir`, in dependency order.
pub async fn run(data_dir: &Path, repos: &Repos) -> Result<()> {
    load_categories(data_dir, repos).await?;
    load_users(data_dir, repos).await?;
    load_sellers(data_dir, repos).await?;
    load_products(data_dir, repos).await?;
    load_orders(data_dir, repos).await?;
    load_embeddings(data_dir, repos).await?;
    tracing::info!("relational load complete");
    Ok(())
}

async fn load_categories(data_dir: &Path, repos: &Repos) -> Result<()> {
    let records: Vec<CategoryRecord> = read_csv(data_dir, "categories")?;
    let categories: Vec<NewCategory> = records
        .into_iter()
        .map(|r| NewCategory {
            name: r.name,
            description: r.description,
        })
        .collect();
    repos.categories.upsert_many(&categories).await?;
    tracing::info!(count = categories.len(), "categories loaded");
    Ok(())
}

async fn load_users(data_dir: &Path, repos: &Repos) -> Result<()> {
    let records: Vec<UserRecord> = read_csv(data_dir, "users")?;
    let users: Vec<NewUser> = records
        .into_iter()
        .map(|r| NewUser {
            email: r.email,
            full_name: r.name,
            join_date: r.join_date,
        })
        .collect();
    repos.users.insert_many(&users).await?;
    tracing::info!(count = users.len(), "users loaded");
    Ok(())
}

/// Sellers are users with a synthesized email plus a sellers row.
async fn load_sellers(data_dir: &Path, repos: &Repos) -> Result<()> {
    let records: Vec<SellerRecord> = read_csv(data_dir, "sellers")?;

    let users: Vec<NewUser> = records
        .iter()
        .map(|r| NewUser {
            email: seller_email(&r.id),
            full_name: r.name.clone(),
            join_date: r.joined,
        })
        .collect();
    repos.users.insert_many(&users).await?;

    let user_ids = repos.users.ids_by_email().await?;
    let sellers: Vec<NewSeller> = records
        .iter()
        .filter_map(|r| {
            let user_id = user_ids.get(&seller_email(&r.id)).copied()?;
            Some(NewSeller {
                user_id,
                rating: r.rating,
            })
        })
        .collect();
    repos.users.insert_sellers(&sellers).await?;
    tracing::info!(count = sellers.len(), "sellers loaded");
    Ok(())
}

async fn load_products(data_dir: &Path, repos: &Repos) -> Result<()> {
    let records: Vec<ProductRecord> = read_csv(data_dir, "products")?;

    // Categories referenced by products may not all appear in categories.csv.
    let names: Vec<NewCategory> = records
        .iter()
        .map(|r| r.category.clone())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .map(|name| NewCategory {
            name,
            description: None,
        })
        .collect();
    repos.categories.upsert_many(&names).await?;

    let category_ids = repos.categories.name_to_id().await?;
    let seller_ids = seller_ids_by_code(repos).await?;

    let mut products = Vec::with_capacity(records.len());
    for r in records {
        let Some(category_id) = category_ids.get(&r.category).copied() else {
            tracing::warn!(product = %r.name, category = %r.category, "skipping product with unknown category");
            continue;
        };
        let Some(seller_id) = seller_ids.get(&r.seller_id.to_uppercase()).copied() else {
            tracing::warn!(product = %r.name, seller = %r.seller_id, "skipping product with unknown seller");
            continue;
        };
        products.push(NewProduct {
            category_id,
            seller_id,
            name: r.name,
            description: r.description,
            price_cents: price_cents(r.price),
        });
    }
    repos.products.insert_many(&products).await?;
    tracing::info!(count = products.len(), "products loaded");
    Ok(())
}

/// Seller code ("S01") → seller id, recovered from the synthesized emails.
async fn seller_ids_by_code(repos: &Repos) -> Result<HashMap<String, i64>> {
    let by_email = repos.users.seller_ids_by_email().await?;
    Ok(by_email
        .into_iter()
        .filter_map(|(email, id)| {
            let code = email.split('@').next()?.to_uppercase();
            Some((code, id))
        })
        .collect())
}

async fn load_orders(data_dir: &Path, repos: &Repos) -> Result<()> {
    let order_records: Vec<OrderRecord> = read_csv(data_dir, "orders")?;
    let item_records: Vec<OrderItemRecord> = read_csv(data_dir, "order_items")?;

    let orders: Vec<Order> = order_records
        .iter()
        .map(|r| {
            Ok(Order {
                id: id_code(&r.id)?,
                user_id: id_code(&r.user_id)?,
                created_at: r.created_at,
            })
        })
        .collect::<Result<_>>()?;

    let items: Vec<NewOrderItem> = item_records
        .iter()
        .map(|r| {
            Ok(NewOrderItem {
                order_id: id_code(&r.order_id)?,
                product_id: id_code(&r.product_id)?,
                quantity: r.quantity,
                price_cents: price_cents(r.price),
            })
        })
        .collect::<Result<_>>()?;

    repos.orders.load(&orders, &items).await?;
    tracing::info!(orders = orders.len(), items = items.len(), "orders loaded");
    Ok(())
}

async fn load_embeddings(data_dir: &Path, repos: &Repos) -> Result<()> {
    let path = data_dir.join("product_embeddings.csv");
    if !path.exists() {
        tracing::info!("no pre-computed embeddings, skipping");
        return Ok(());
    }

    let records: Vec<EmbeddingRecord> = read_csv(data_dir, "product_embeddings")?;
    let mut count = 0usize;
    for r in &records {
        let product_id = id_code(&r.product_id)?;
        let embedding: Vec<f32> = serde_json::from_str(&r.embedding)
            .with_context(|| format!("malformed embedding for {}", r.product_id))?;
        repos.embeddings.upsert(product_id, &embedding).await?;
        count += 1;
    }
    tracing::info!(count, "embeddings loaded");
    Ok(())
}
