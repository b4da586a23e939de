//! Exécution des requêtes d'agrégation sur PostGIS

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tracing::debug;

use super::{AssetStore, StoreError};
use crate::query::SpatialQuery;
use crate::report::AssetSummary;

/// Entrepôt PostGIS adossé à un pool deadpool
#[derive(Clone)]
pub struct PgAssetStore {
    pool: Pool,
}

impl PgAssetStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    async fn fetch_summaries(&self, query: &SpatialQuery) -> Result<Vec<AssetSummary>, StoreError> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(&query.sql).await?;

        let rows = client.query(&stmt, &query.params()).await?;
        debug!(query = %query.kind, rows = rows.len(), "Query executed");

        rows.iter()
            .map(|row| summary_from_row(row, query.kind.has_length()))
            .collect()
    }
}

fn summary_from_row(row: &Row, with_length: bool) -> Result<AssetSummary, StoreError> {
    let mapping = |e: tokio_postgres::Error| StoreError::RowMapping(e.to_string());

    let length = if with_length {
        row.try_get::<_, Option<f64>>("length").map_err(mapping)?
    } else {
        None
    };

    Ok(AssetSummary {
        aquagis_type: row.try_get("aquagis_type").map_err(mapping)?,
        objects_count: row.try_get("objects_count").map_err(mapping)?,
        length,
    })
}
