mod codes;
mod config;
mod error;
mod handlers;
mod loaders;
mod models;
mod repos;
mod services;
mod state;
mod stores;
#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{http, Router};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Config,
    repos::{PgCategoryRepo, PgEmbeddingRepo, PgOrderRepo, PgProductRepo, PgUserRepo, Repos},
    services::{
        CachedSearch, EmbeddingProvider, HttpEmbeddingProvider, MongoPreferenceStore,
        Neo4jGraphStore, PurchaseGenerator, SimEmbeddingProvider,
    },
    state::AppState,
    stores::{RedisCacheStore, RedisCartStore, RedisHotProductsStore, RedisRateLimiter, Stores},
};

#[derive(Parser)]
#[command(name = "api")]
#[command(about = "Polyglot catalog demo server and loaders")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Run database migrations and exit.
    Migrate,
    /// Load relational CSV data into Postgres.
    LoadRelational {
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Load document JSON data into MongoDB.
    LoadDocuments {
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Mirror reference data into Neo4j.
    LoadGraph {
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Embed product descriptions into pgvector.
    LoadVectors {
        #[arg(long)]
        data_dir: PathBuf,
        /// Seed for the deterministic provider when no embedding service is configured.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Generate synthetic purchases into Postgres + Neo4j.
    GeneratePurchases {
        #[arg(long, default_value_t = 100)]
        total: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS operations
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();
    let config = envy::prefixed("CATALOG_").from_env::<Config>()?;

    // Initialize Sentry for error tracking (must be done early, guard must stay alive)
    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.env.clone().into()),
                ..Default::default()
            },
        ))
    });

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let database = connect_postgres(&config).await?;
            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&database).await?;
            tracing::info!("Migrations complete");
            Ok(())
        }
        Command::LoadRelational { data_dir } => {
            let database = connect_postgres(&config).await?;
            loaders::relational::run(&data_dir, &build_repos(database)).await
        }
        Command::LoadDocuments { data_dir } => {
            let preferences = connect_mongo(&config).await?;
            loaders::documents::run(&data_dir, &preferences).await
        }
        Command::LoadGraph { data_dir } => {
            let graph = connect_neo4j(&config).await?;
            loaders::graph::run(&data_dir, &graph).await
        }
        Command::LoadVectors { data_dir, seed } => {
            let database = connect_postgres(&config).await?;
            let embeddings = PgEmbeddingRepo::new(database);
            let provider = embedding_provider(&config, seed);
            loaders::vectors::run(&data_dir, provider.as_ref(), &embeddings).await
        }
        Command::GeneratePurchases { total, seed } => {
            let database = connect_postgres(&config).await?;
            let repos = build_repos(database);
            let preferences = connect_mongo(&config).await?;
            let graph = connect_neo4j(&config).await?;

            let generator = PurchaseGenerator::new(
                repos.users,
                repos.categories,
                repos.products,
                repos.orders,
                Arc::new(preferences),
                Arc::new(graph),
            );
            let created = generator.run(total, seed).await?;
            tracing::info!(created, "purchase generation complete");
            Ok(())
        }
    }
}

async fn connect_postgres(config: &Config) -> Result<Pool<Postgres>> {
    PgPoolOptions::new()
        .max_connections(25)
        .connect(&config.database_url)
        .await
        .context("connecting to Postgres failed")
}

async fn connect_mongo(config: &Config) -> Result<MongoPreferenceStore> {
    let client = mongodb::Client::with_uri_str(&config.mongo_url)
        .await
        .context("connecting to MongoDB failed")?;
    let store = MongoPreferenceStore::new(client.database(&config.mongo_database));
    // with_uri_str is lazy; fail fast instead of limping along half-initialized.
    crate::services::PreferenceStore::ping(&store)
        .await
        .context("MongoDB unavailable")?;
    Ok(store)
}

async fn connect_neo4j(config: &Config) -> Result<Neo4jGraphStore> {
    let graph = neo4rs::Graph::new(
        &config.neo4j_uri,
        &config.neo4j_user,
        &config.neo4j_password,
    )
    .await
    .context("connecting to Neo4j failed")?;
    Ok(Neo4jGraphStore::new(graph))
}

fn build_repos(database: Pool<Postgres>) -> Repos {
    Repos {
        users: Arc::new(PgUserRepo::new(database.clone())),
        categories: Arc::new(PgCategoryRepo::new(database.clone())),
        products: Arc::new(PgProductRepo::new(database.clone())),
        orders: Arc::new(PgOrderRepo::new(database.clone())),
        embeddings: Arc::new(PgEmbeddingRepo::new(database)),
    }
}

fn embedding_provider(config: &Config, seed: u64) -> Arc<dyn EmbeddingProvider> {
    match &config.embedding_url {
        Some(url) => Arc::new(HttpEmbeddingProvider::new(url.clone())),
        None => {
            tracing::warn!("no embedding service configured, using deterministic vectors");
            Arc::new(SimEmbeddingProvider::with_seed(seed))
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let database = connect_postgres(&config).await?;
    let redis = redis::Client::open(config.redis_url.as_str())?;
    let preferences = connect_mongo(&config).await?;
    let graph = connect_neo4j(&config).await?;

    let repos = build_repos(database);

    let cache = Arc::new(RedisCacheStore::new(redis.clone()));
    let stores = Stores {
        cart: Arc::new(RedisCartStore::new(redis.clone(), config.cart_ttl_secs)),
        rate_limiter: Arc::new(RedisRateLimiter::new(
            redis.clone(),
            config.rate_limit_requests,
            config.rate_limit_window_secs,
        )),
        hot_products: Arc::new(RedisHotProductsStore::new(redis)),
        cache: cache.clone(),
    };

    let search = CachedSearch::new(cache, repos.products.clone(), config.cache_ttl_secs);

    let state = AppState {
        config: config.clone(),
        repos,
        stores,
        preferences: Arc::new(preferences),
        graph: Arc::new(graph),
        embedding: embedding_provider(&config, 42),
        search,
    };

    // Request ID header name
    let x_request_id = http::HeaderName::from_static("x-request-id");

    let app = Router::new()
        .nest("/health", handlers::health::router())
        .nest("/cart", handlers::cart::router())
        .nest("/orders", handlers::orders::router())
        .nest("/search", handlers::search::router())
        .nest("/products", handlers::products::router())
        .nest("/recommendations", handlers::recommendations::router())
        .with_state(state)
        // Request ID: generate UUID, include in logs, return in response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB limit

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
