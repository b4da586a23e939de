//! Traitement d'une zone DMA : validation, normalisation, requêtes

use std::time::Instant;

use dma_geom::Epsg;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::LayersConfig;
use crate::error::DmaError;
use crate::query::build_all;
use crate::report::{DmaResources, ErrorEntry, ResponseEnvelope};
use crate::request::DmaRequest;
use crate::store::AssetStore;

/// Paramètres partagés par toutes les requêtes
#[derive(Debug, Clone)]
pub struct DmaSettings {
    pub layers: LayersConfig,

    /// CRS client quand `crs` est absent
    pub default_source_crs: Epsg,

    /// CRS de mesure quand `result_crs` est absent
    pub default_result_crs: Epsg,
}

impl Default for DmaSettings {
    fn default() -> Self {
        Self {
            layers: LayersConfig::default(),
            default_source_crs: Epsg::WGS84,
            default_result_crs: Epsg::DEFAULT_MEASUREMENT,
        }
    }
}

/// Traite un corps de requête brut
///
/// Ne renvoie jamais d'erreur : les échecs sont listés dans
/// `ResponseEnvelope::errors` avec les résultats déjà obtenus.
pub async fn handle(store: &dyn AssetStore, settings: &DmaSettings, body: &[u8]) -> ResponseEnvelope {
    let started = Instant::now();

    let request: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            let err = DmaError::from(e);
            warn!(error = %err, "Rejected request body");
            return ResponseEnvelope::new(
                Value::Null,
                DmaResources::default(),
                started.elapsed(),
                vec![err.to_entry()],
            );
        }
    };

    let geom_type = request
        .get("geom_type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let span = info_span!("dma_request", geom_type = %geom_type);

    async {
        let mut resources = DmaResources::default();
        let mut errors: Vec<ErrorEntry> = Vec::new();

        if let Err(err) = process(store, settings, &request, &mut resources).await {
            warn!(error = %err, kind = ?err.kind(), "DMA request failed");
            errors.push(err.to_entry());
        }

        let envelope = ResponseEnvelope::new(request, resources, started.elapsed(), errors);
        info!(
            points = envelope.response.aquagis_points.len(),
            lines_intersecting = envelope.response.aquagis_line_intersection.len(),
            lines_within = envelope.response.aquagis_line_within.len(),
            errors = envelope.errors.len(),
            exec_time_ms = %envelope.exec_time_ms,
            "DMA request completed"
        );
        envelope
    }
    .instrument(span)
    .await
}

/// Valide, normalise puis exécute les trois requêtes dans l'ordre
///
/// S'arrête à la première requête en échec ; les lignes des requêtes
/// précédentes restent dans `resources`.
async fn process(
    store: &dyn AssetStore,
    settings: &DmaSettings,
    request: &Value,
    resources: &mut DmaResources,
) -> Result<(), DmaError> {
    let request = DmaRequest::from_json(request, settings)?;
    let polygon = request.polygon.normalize()?;

    debug!(
        source_crs = %request.polygon.source_crs,
        result_crs = %request.result_crs,
        wkt = %polygon.wkt,
        "Polygon normalized"
    );

    for query in build_all(&settings.layers, &polygon, request.result_crs) {
        debug!(query = %query.kind, sql = %query.sql.trim(), "Running query");
        let rows = store
            .fetch_summaries(&query)
            .await
            .map_err(|e| DmaError::query(query.kind, e))?;
        resources.set(query.kind, rows);
    }

    Ok(())
}
