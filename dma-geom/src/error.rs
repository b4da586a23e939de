//! Types d'erreurs pour le crate dma-geom

use thiserror::Error;

use crate::Epsg;

/// Erreurs pouvant survenir lors de la normalisation d'un polygone DMA
#[derive(Debug, Error)]
pub enum GeomError {
    /// Entrée client invalide (type de géométrie, coordonnées, CRS)
    #[error("{reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Littéral WKT rejeté par le parseur ou ring invalide
    #[error("Invalid geometry {wkt}: {reason}")]
    InvalidGeometry { wkt: String, reason: String },

    /// CRS non résolvable ou transformation impossible
    #[error("Projection {from} -> {to} failed: {reason}")]
    Projection { from: Epsg, to: Epsg, reason: String },
}

impl GeomError {
    /// Crée une erreur d'entrée avec le champ fautif
    pub fn invalid_input(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(wkt: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            wkt: wkt.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de projection
    pub fn projection(from: Epsg, to: Epsg, reason: impl std::fmt::Display) -> Self {
        Self::Projection {
            from,
            to,
            reason: reason.to_string(),
        }
    }
}
