//! Routes HTTP du service

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::dma;
use crate::report::ResponseEnvelope;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "aquagis dma resources";

/// Date de publication de la version courante
pub const VERSION_DATE: &str = "2026.10.19";

/// Construit le routeur avec l'état partagé
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/v1/check", get(check))
        .route("/healthcheck", get(healthcheck))
        .route("/get_dma_resources", post(get_dma_resources))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Description du service
async fn index() -> Json<Value> {
    let cpu_count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    Json(json!({
        "type": "service",
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "version_date": VERSION_DATE,
        "current_time": Utc::now().format("%Y%m%dT%H%M%S").to_string(),
        "sys_cpu_count": cpu_count,
        "sys_os": std::env::consts::OS,
    }))
}

async fn check() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "author": env!("CARGO_PKG_AUTHORS"),
    }))
}

async fn healthcheck() -> Json<Value> {
    Json(json!({ "service": "working" }))
}

/// Le corps est lu brut et parsé en JSON quel que soit le `Content-Type`
async fn get_dma_resources(State(state): State<AppState>, body: Bytes) -> Json<ResponseEnvelope> {
    let envelope = dma::handle(state.store.as_ref(), &state.settings, &body).await;
    Json(envelope)
}
