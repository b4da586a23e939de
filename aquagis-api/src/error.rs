//! Erreurs du traitement d'une zone DMA

use dma_geom::GeomError;
use serde_json::Value;
use thiserror::Error;

use crate::query::QueryKind;
use crate::report::{ErrorEntry, ErrorKind};
use crate::store::StoreError;

/// Échec d'une étape du traitement
#[derive(Debug, Error)]
pub enum DmaError {
    /// Champ de requête absent ou mal typé
    #[error("{reason}")]
    Input { field: &'static str, reason: String },

    /// Normalisation refusée (entrée, géométrie ou projection)
    #[error(transparent)]
    Geom(#[from] GeomError),

    /// Corps de requête illisible
    #[error("Invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),

    /// Requête rejetée par l'entrepôt
    #[error("Query {kind} failed: {source}")]
    QueryExecution {
        kind: QueryKind,
        #[source]
        source: StoreError,
    },
}

impl DmaError {
    pub fn input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Input {
            field,
            reason: reason.into(),
        }
    }

    pub fn query(kind: QueryKind, source: StoreError) -> Self {
        Self::QueryExecution { kind, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DmaError::Input { .. }
            | DmaError::Geom(GeomError::InvalidInput { .. })
            | DmaError::Body(_) => ErrorKind::Input,
            DmaError::Geom(GeomError::InvalidGeometry { .. }) => ErrorKind::Geometry,
            DmaError::Geom(GeomError::Projection { .. }) => ErrorKind::Projection,
            DmaError::QueryExecution { .. } => ErrorKind::QueryExecution,
        }
    }

    /// Entrée de la liste `errors` de la réponse
    pub fn to_entry(&self) -> ErrorEntry {
        let kind = self.kind();
        match self {
            DmaError::Input { field, reason } => {
                ErrorEntry::with_error(kind, reason).context("field", *field)
            }
            DmaError::Geom(GeomError::InvalidInput {
                field: "geom_type",
                value,
                reason,
            }) => ErrorEntry::with_msg(kind, "geom_type", Value::String(value.clone()), reason),
            DmaError::Geom(GeomError::InvalidInput { field, reason, .. }) => {
                ErrorEntry::with_error(kind, reason).context("field", *field)
            }
            DmaError::Geom(GeomError::InvalidGeometry { wkt, reason }) => {
                ErrorEntry::with_error(kind, reason).context("wkt", wkt.as_str())
            }
            DmaError::Geom(GeomError::Projection { from, to, .. }) => {
                ErrorEntry::with_error(kind, self.to_string())
                    .context("from", from.code())
                    .context("to", to.code())
            }
            DmaError::Body(err) => ErrorEntry::with_error(kind, self.to_string())
                .context("line", err.line())
                .context("column", err.column()),
            DmaError::QueryExecution { kind: query, source } => {
                ErrorEntry::with_error(kind, source.to_string()).context("query", query.as_str())
            }
        }
    }
}
