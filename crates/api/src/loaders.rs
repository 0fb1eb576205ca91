//! Reference-data loaders.
//!
//! One-shot ETL from the synthetic datasets into the four stores, run as
//! subcommands of the service binary (init-container style):
//!
//! - **relational** - CSV → Postgres (categories, users, sellers, products,
//!   orders, order_items, pre-computed embeddings)
//! - **documents** - JSON → MongoDB (reviews, specs, profiles, preferences)
//! - **graph** - CSV → Neo4j (nodes, BELONGS_TO, PURCHASED)
//! - **vectors** - product descriptions → embedding provider → pgvector
//!
//! All loads are conflict-skip upserts, so re-running a loader is harmless.

pub mod documents;
pub mod graph;
pub mod relational;
pub mod vectors;
