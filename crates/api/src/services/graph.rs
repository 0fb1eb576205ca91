//! Graph store access (Neo4j).

use anyhow::Result;
use async_trait::async_trait;
use neo4rs::{query, Graph};

use crate::models::{PurchaseEdge, Recommendation};

/// A Product node plus its BELONGS_TO category.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphProduct {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub category_name: String,
}

/// A User node.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphUser {
    pub id: i64,
    pub name: String,
    pub join_date: String,
}

/// Store for the co-purchase graph: node upserts for the loaders, PURCHASED
/// edge upserts for the purchase generator, and the recommendation queries.
///
/// A repeated (user, product) purchase accumulates quantity on the existing
/// edge instead of creating a second one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Health check - verify Neo4j connectivity.
    async fn ping(&self) -> Result<bool>;

    /// Create the unique-id constraints (idempotent).
    async fn ensure_constraints(&self) -> Result<()>;

    /// MERGE Category nodes by name, setting ids on create.
    async fn merge_categories(&self, categories: &[(i64, String)]) -> Result<()>;

    /// MERGE Product nodes and their BELONGS_TO edges.
    async fn merge_products(&self, products: &[GraphProduct]) -> Result<()>;

    /// MERGE User nodes.
    async fn merge_users(&self, users: &[GraphUser]) -> Result<()>;

    /// Upsert PURCHASED edges, accumulating quantity on repeats.
    async fn upsert_purchases(&self, purchases: &[PurchaseEdge]) -> Result<()>;

    /// Products bought by users who also bought this product.
    async fn also_bought(&self, product_id: i64, limit: i64) -> Result<Vec<Recommendation>>;

    /// Most frequent co-purchases of this product.
    async fn frequently_bought_together(
        &self,
        product_id: i64,
        limit: i64,
    ) -> Result<Vec<Recommendation>>;

    /// Products this user's co-purchasers bought that the user hasn't.
    async fn personalized(&self, user_id: i64, limit: i64) -> Result<Vec<Recommendation>>;
}

/// Neo4j implementation of GraphStore.
#[derive(Clone)]
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    async fn recommendations(&self, q: neo4rs::Query) -> Result<Vec<Recommendation>> {
        let mut stream = self.graph.execute(q).await?;
        let mut recs = Vec::new();
        while let Some(row) = stream.next().await? {
            recs.push(Recommendation {
                id: row.get("id")?,
                name: row.get("name")?,
                freq: row.get("freq")?,
            });
        }
        Ok(recs)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn ping(&self) -> Result<bool> {
        self.graph.run(query("RETURN 1")).await?;
        Ok(true)
    }

    async fn ensure_constraints(&self) -> Result<()> {
        for cypher in [
            "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT product_id IF NOT EXISTS FOR (p:Product) REQUIRE p.id IS UNIQUE",
            "CREATE CONSTRAINT category_id IF NOT EXISTS FOR (c:Category) REQUIRE c.id IS UNIQUE",
        ] {
            self.graph.run(query(cypher)).await?;
        }
        Ok(())
    }

    async fn merge_categories(&self, categories: &[(i64, String)]) -> Result<()> {
        for (id, name) in categories {
            self.graph
                .run(
                    query("MERGE (c:Category {name:$name}) ON CREATE SET c.id=$cid")
                        .param("name", name.as_str())
                        .param("cid", *id),
                )
                .await?;
        }
        Ok(())
    }

    async fn merge_products(&self, products: &[GraphProduct]) -> Result<()> {
        for product in products {
            self.graph
                .run(
                    query(
                        "MERGE (p:Product {id:$pid}) \
                           SET p.name=$name, p.price=$price \
                         WITH p \
                         MERGE (c:Category {name:$cat}) \
                         MERGE (p)-[:BELONGS_TO]->(c)",
                    )
                    .param("pid", product.id)
                    .param("name", product.name.as_str())
                    .param("price", product.price_cents)
                    .param("cat", product.category_name.as_str()),
                )
                .await?;
        }
        Ok(())
    }

    async fn merge_users(&self, users: &[GraphUser]) -> Result<()> {
        for user in users {
            self.graph
                .run(
                    query("MERGE (u:User {id:$uid}) SET u.name=$name, u.join_date=$join")
                        .param("uid", user.id)
                        .param("name", user.name.as_str())
                        .param("join", user.join_date.as_str()),
                )
                .await?;
        }
        Ok(())
    }

    async fn upsert_purchases(&self, purchases: &[PurchaseEdge]) -> Result<()> {
        for purchase in purchases {
            self.graph
                .run(
                    query(
                        "MATCH (u:User {id:$uid}), (p:Product {id:$pid}) \
                         MERGE (u)-[r:PURCHASED {date:$d}]->(p) \
                         ON CREATE SET r.quantity=$q \
                         ON MATCH  SET r.quantity = r.quantity + $q",
                    )
                    .param("uid", purchase.user_id)
                    .param("pid", purchase.product_id)
                    .param("q", purchase.quantity)
                    .param("d", purchase.date.to_string()),
                )
                .await?;
        }
        Ok(())
    }

    async fn also_bought(&self, product_id: i64, limit: i64) -> Result<Vec<Recommendation>> {
        self.recommendations(
            query(
                "MATCH (p1:Product {id:$pid})<-[:PURCHASED]-(:User)-[:PURCHASED]->(p2:Product) \
                 WHERE p1 <> p2 \
                 WITH p2, COUNT(*) AS freq \
                 RETURN p2.id AS id, p2.name AS name, freq \
                 ORDER BY freq DESC \
                 LIMIT $lim",
            )
            .param("pid", product_id)
            .param("lim", limit),
        )
        .await
    }

    async fn frequently_bought_together(
        &self,
        product_id: i64,
        limit: i64,
    ) -> Result<Vec<Recommendation>> {
        self.recommendations(
            query(
                "MATCH (:Product {id:$pid})<-[:PURCHASED]-(u:User)-[:PURCHASED]->(p:Product) \
                 WITH p, COUNT(*) AS freq \
                 ORDER BY freq DESC \
                 LIMIT $lim \
                 RETURN p.id AS id, p.name AS name, freq",
            )
            .param("pid", product_id)
            .param("lim", limit),
        )
        .await
    }

    async fn personalized(&self, user_id: i64, limit: i64) -> Result<Vec<Recommendation>> {
        self.recommendations(
            query(
                "MATCH (u:User {id:$uid})-[:PURCHASED]->(p1:Product)\
                 <-[:PURCHASED]-(:User)-[:PURCHASED]->(p2:Product) \
                 WHERE NOT (u)-[:PURCHASED]->(p2) \
                 WITH p2, COUNT(*) AS freq \
                 ORDER BY freq DESC \
                 LIMIT $lim \
                 RETURN p2.id AS id, p2.name AS name, freq",
            )
            .param("uid", user_id)
            .param("lim", limit),
        )
        .await
    }
}
