//! Product catalog lookups
//!
//! The order manager only needs to know which products exist in a
//! restaurant and how to label them next to an order line.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::models::ProductProjection;
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, product};

/// Product lookups for one restaurant
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Projections of the active products among `product_ids`, keyed by id.
    /// Unknown or foreign ids are absent from the map.
    async fn lookup(
        &self,
        restaurant_id: i64,
        product_ids: &[i64],
    ) -> RepoResult<HashMap<i64, ProductProjection>>;
}

/// Catalog backed by the `product` table
#[derive(Clone, Debug)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCatalog for SqliteCatalog {
    async fn lookup(
        &self,
        restaurant_id: i64,
        product_ids: &[i64],
    ) -> RepoResult<HashMap<i64, ProductProjection>> {
        let mut ids = product_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut conn = self.pool.acquire().await?;
        let products = product::find_by_ids(&mut conn, restaurant_id, &ids).await?;
        Ok(products
            .iter()
            .map(|p| (p.id, ProductProjection::from(p)))
            .collect())
    }
}
