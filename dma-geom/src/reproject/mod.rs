//! Reprojection des polygones DMA
//!
//! Deux implémentations :
//! - `ReprojectorLite` : pure Rust, WGS84 (EPSG:4326) <-> Web Mercator (EPSG:3857),
//!   le cas de loin le plus fréquent côté client
//! - `Reprojector` : via PROJ pour tout autre couple de CRS (feature `reproject`)
//!
//! `SmartReprojector` choisit automatiquement.

mod ellipsoid;
mod mercator;
#[cfg(feature = "reproject")]
mod full;
mod smart;

#[cfg(feature = "reproject")]
pub use full::Reprojector;
pub use mercator::MAX_LATITUDE;
pub use smart::SmartReprojector;

use geo::{Coord, Geometry, MapCoords};

use crate::{Epsg, GeomError};

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Ramène une géométrie de l'ordre d'axes EPSG de `crs` vers (x, y)
///
/// Les reprojecteurs travaillent en x = longitude, y = latitude ; un littéral
/// EPSG:4326 est en latitude d'abord.
pub fn authority_to_xy(geom: Geometry, crs: Epsg) -> Geometry {
    if crs.is_latitude_first() {
        geom.map_coords(|c| Coord { x: c.y, y: c.x })
    } else {
        geom
    }
}

/// Reprojection légère WGS84 <-> Web Mercator
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source: Epsg,
    target: Epsg,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source: Epsg, target: Epsg) -> Result<Self, GeomError> {
        if !Self::is_supported(source, target) {
            return Err(GeomError::projection(
                source,
                target,
                "reproject_lite supports only EPSG:4326 <-> EPSG:3857",
            ));
        }
        Ok(Self { source, target })
    }

    /// Vérifie si le couple est supporté
    pub fn is_supported(source: Epsg, target: Epsg) -> bool {
        matches!(
            (source, target),
            (Epsg::WGS84, Epsg::WEB_MERCATOR) | (Epsg::WEB_MERCATOR, Epsg::WGS84)
        )
    }

    /// Transforme un point (x, y) de la source vers la cible
    ///
    /// En EPSG:4326, x est la longitude et y la latitude (ordre GIS).
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), GeomError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeomError::projection(
                self.source,
                self.target,
                format!("non-finite coordinate ({x}, {y})"),
            ));
        }
        match self.target {
            Epsg::WEB_MERCATOR => Ok(mercator::geographic_to_web_mercator(
                Geographic::from_degrees(x, y),
            )),
            _ => Ok(mercator::web_mercator_to_geographic(x, y).to_degrees()),
        }
    }

    /// Transforme une géométrie sommet par sommet
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, GeomError> {
        geom.try_map_coords(|c| -> Result<Coord, GeomError> {
            let (x, y) = self.transform_point(c.x, c.y)?;
            Ok(Coord { x, y })
        })
    }
}
