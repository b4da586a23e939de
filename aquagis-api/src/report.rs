//! Enveloppe de réponse avec erreurs en bande
//!
//! Le service répond toujours 200 : les échecs sont listés dans `errors`,
//! les résultats déjà obtenus sont conservés.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::QueryKind;

/// Agrégat d'une couche pour un sous-type d'actif
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    /// Sous-type (`aq_type`), absent si non renseigné en base
    pub aquagis_type: Option<String>,

    /// Nombre d'objets du sous-type
    pub objects_count: i64,

    /// Longueur cumulée en mètres (lignes uniquement)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

/// Résultats par requête
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DmaResources {
    pub aquagis_points: Vec<AssetSummary>,
    pub aquagis_line_intersection: Vec<AssetSummary>,
    pub aquagis_line_within: Vec<AssetSummary>,
}

impl DmaResources {
    /// Range les lignes d'une requête sous la clé correspondante
    pub fn set(&mut self, kind: QueryKind, rows: Vec<AssetSummary>) {
        match kind {
            QueryKind::PointsWithin => self.aquagis_points = rows,
            QueryKind::LinesIntersecting => self.aquagis_line_intersection = rows,
            QueryKind::LinesWithin => self.aquagis_line_within = rows,
        }
    }

    pub fn get(&self, kind: QueryKind) -> &[AssetSummary] {
        match kind {
            QueryKind::PointsWithin => &self.aquagis_points,
            QueryKind::LinesIntersecting => &self.aquagis_line_intersection,
            QueryKind::LinesWithin => &self.aquagis_line_within,
        }
    }
}

/// Catégorie d'erreur exposée au client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Requête mal formée ou type de géométrie non supporté
    Input,
    /// Littéral WKT rejeté
    Geometry,
    /// CRS non résolvable
    Projection,
    /// Requête rejetée par l'entrepôt
    QueryExecution,
}

/// Entrée de la liste `errors`
///
/// Le contexte (`geom_type`, `field`, `query`...) est aplati au même niveau
/// que le message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    #[serde(flatten)]
    pub context: Map<String, Value>,

    pub kind: ErrorKind,

    /// Message du rejet de type de géométrie
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    /// Message des autres erreurs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorEntry {
    /// Erreur décrite par `msg`, avec le champ fautif en clé
    pub fn with_msg(kind: ErrorKind, key: &str, value: Value, msg: impl Into<String>) -> Self {
        let mut context = Map::new();
        context.insert(key.to_string(), value);
        Self {
            context,
            kind,
            msg: Some(msg.into()),
            error: None,
        }
    }

    /// Erreur décrite par `error`
    pub fn with_error(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            context: Map::new(),
            kind,
            msg: None,
            error: Some(error.into()),
        }
    }

    /// Ajoute une clé de contexte
    pub fn context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }
}

/// Réponse complète de `/get_dma_resources`
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    /// Requête brute (null si le corps n'était pas du JSON)
    pub request: Value,

    pub response: DmaResources,

    /// Durée de traitement en millisecondes, 3 décimales
    pub exec_time_ms: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEntry>,
}

impl ResponseEnvelope {
    pub fn new(
        request: Value,
        response: DmaResources,
        elapsed: Duration,
        errors: Vec<ErrorEntry>,
    ) -> Self {
        Self {
            request,
            response,
            exec_time_ms: format_exec_time(elapsed),
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Formate une durée en millisecondes avec 3 décimales
pub fn format_exec_time(elapsed: Duration) -> String {
    format!("{:.3}", elapsed.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exec_time_format() {
        assert_eq!(format_exec_time(Duration::from_micros(1500)), "1.500");
        assert_eq!(format_exec_time(Duration::from_nanos(123_456_789)), "123.457");
    }

    #[test]
    fn test_errors_omitted_when_empty() {
        let envelope = ResponseEnvelope::new(
            json!({"geom_type": "Polygon"}),
            DmaResources::default(),
            Duration::from_millis(2),
            vec![],
        );
        let value = serde_json::to_value(&envelope).unwrap();

        assert!(value.get("errors").is_none());
        assert_eq!(value["exec_time_ms"], "2.000");
        assert_eq!(value["response"]["aquagis_points"], json!([]));
        assert_eq!(value["response"]["aquagis_line_intersection"], json!([]));
        assert_eq!(value["response"]["aquagis_line_within"], json!([]));
    }

    #[test]
    fn test_error_entry_shapes() {
        let rejected = ErrorEntry::with_msg(
            ErrorKind::Input,
            "geom_type",
            json!("Point"),
            "Point is not suitable for DMA zone extraction",
        );
        assert_eq!(
            serde_json::to_value(&rejected).unwrap(),
            json!({
                "geom_type": "Point",
                "kind": "input",
                "msg": "Point is not suitable for DMA zone extraction"
            })
        );

        let failed = ErrorEntry::with_error(ErrorKind::QueryExecution, "relation does not exist")
            .context("query", "points_within");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({
                "query": "points_within",
                "kind": "query_execution",
                "error": "relation does not exist"
            })
        );
    }

    #[test]
    fn test_point_summary_has_no_length() {
        let point = AssetSummary {
            aquagis_type: Some("valve".into()),
            objects_count: 3,
            length: None,
        };
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"aquagis_type": "valve", "objects_count": 3})
        );
    }

    #[test]
    fn test_resources_set_by_kind() {
        let mut resources = DmaResources::default();
        let row = AssetSummary {
            aquagis_type: Some("pipe".into()),
            objects_count: 1,
            length: Some(12.5),
        };
        resources.set(QueryKind::LinesWithin, vec![row.clone()]);

        assert_eq!(resources.get(QueryKind::LinesWithin), &[row]);
        assert!(resources.get(QueryKind::LinesIntersecting).is_empty());
        assert!(resources.aquagis_points.is_empty());
    }
}
