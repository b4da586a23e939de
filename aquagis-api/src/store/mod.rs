//! Accès à l'entrepôt spatial

pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::query::SpatialQuery;
use crate::report::AssetSummary;

pub use pool::{create_pool, test_connection, DatabaseConfig, SslMode};
pub use postgres::PgAssetStore;

/// Erreurs d'exécution d'une requête sur l'entrepôt
#[derive(Debug, Error)]
pub enum StoreError {
    /// Pool épuisé ou connexion impossible
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// Requête rejetée par PostgreSQL
    #[error("{}", postgres_message(.0))]
    Postgres(#[from] tokio_postgres::Error),

    /// Colonne manquante ou de type inattendu
    #[error("Unexpected row shape: {0}")]
    RowMapping(String),

    /// Entrepôt indisponible
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Message PostgreSQL détaillé quand il existe (`tokio_postgres::Error`
/// n'affiche que "db error" sinon)
fn postgres_message(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => format!("{}: {}", db.code().code(), db.message()),
        None => e.to_string(),
    }
}

/// Exécuteur des requêtes d'agrégation
///
/// Construit une fois au démarrage et partagé entre les requêtes HTTP.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Exécute une requête et renvoie ses lignes agrégées
    async fn fetch_summaries(&self, query: &SpatialQuery) -> Result<Vec<AssetSummary>, StoreError>;
}
