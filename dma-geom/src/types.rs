//! Types de données pour le crate dma-geom

use geojson::PolygonType;
use serde::Serialize;

use crate::Epsg;

/// Polygone tel que reçu du client
#[derive(Debug, Clone)]
pub struct InputPolygon {
    /// Type de géométrie déclaré (doit contenir "polygon")
    pub geom_type: String,

    /// Rings en positions GeoJSON ; le premier est le contour extérieur
    pub rings: PolygonType,

    /// CRS des coordonnées client
    pub source_crs: Epsg,
}

/// Polygone normalisé dans le CRS de stockage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPolygon {
    /// WKT dans `srid`
    pub wkt: String,

    /// CRS du WKT (toujours le CRS de stockage)
    pub srid: Epsg,

    /// Littéral construit avant reprojection, dans le CRS client
    pub source_wkt: String,
}
