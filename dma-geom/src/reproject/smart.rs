//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible.

use geo::Geometry;

use super::ReprojectorLite;
use crate::{Epsg, GeomError};

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
#[derive(Debug)]
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(super::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    /// Crée un nouveau reprojector
    pub fn new(source: Epsg, target: Epsg) -> Result<Self, GeomError> {
        if source == target {
            return Ok(Self::Identity);
        }

        if ReprojectorLite::is_supported(source, target) {
            return Ok(Self::Lite(ReprojectorLite::new(source, target)?));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = super::Reprojector::new(source, target)?;
            return Ok(Self::Proj(proj));
        }

        #[cfg(not(feature = "reproject"))]
        return Err(GeomError::projection(
            source,
            target,
            "only EPSG:4326 <-> EPSG:3857 is available without the 'reproject' feature",
        ));
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, GeomError> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(lite) => lite.transform_geometry(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_geometry(geom),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Lite(_) => "reproject_lite",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj",
        }
    }
}
