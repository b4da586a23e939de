//! # aquagis-api
//!
//! Service HTTP résumant les actifs du réseau d'eau contenus dans une zone
//! DMA (District Metered Area).
//!
//! `POST /get_dma_resources` reçoit un polygone, le normalise en WKT
//! EPSG:3857 avec `dma-geom`, puis interroge l'entrepôt PostGIS :
//!
//! - points dans la zone, comptés par sous-type
//! - lignes intersectant la zone, comptées et mesurées
//! - lignes contenues dans la zone, comptées et mesurées
//!
//! La réponse est toujours un 200 ; les échecs sont listés dans `errors`.
//!
//! ```rust,ignore
//! use aquagis_api::{AquagisServer, DmaSettings, PgAssetStore};
//!
//! let pool = aquagis_api::store::create_pool(&DatabaseConfig::from_env())?;
//! let server = AquagisServer::new(Arc::new(PgAssetStore::new(pool)), DmaSettings::default());
//! server.run("0.0.0.0:8088".parse()?).await?;
//! ```

pub mod config;
pub mod dma;
pub mod error;
pub mod query;
pub mod report;
pub mod request;
pub mod routes;
pub mod state;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use dma::{handle, DmaSettings};
pub use error::DmaError;
pub use report::{AssetSummary, DmaResources, ResponseEnvelope};
pub use state::AppState;
pub use store::{AssetStore, PgAssetStore, StoreError};

/// Serveur HTTP du service
pub struct AquagisServer {
    router: Router,
}

impl AquagisServer {
    pub fn new(store: Arc<dyn AssetStore>, settings: DmaSettings) -> Self {
        let state = AppState::new(store, settings);
        Self {
            router: routes::build_router(state),
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Écoute sur `addr` jusqu'à Ctrl-C
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!(addr = %addr, "aquagis-api listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        info!("aquagis-api stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
