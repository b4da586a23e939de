//! Normalisation : coordonnées client -> WKT dans le CRS de l'entrepôt

use geojson::Position;
use tracing::debug;

use crate::reproject::{authority_to_xy, SmartReprojector};
use crate::ring::{check_geom_type, check_ring, swap_ring};
use crate::wkt::{parse_polygon, polygon_literal, to_wkt};
use crate::{Epsg, GeomError, InputPolygon, NormalizedPolygon, STORAGE_CRS};

/// Normalise un polygone client vers le CRS de stockage (EPSG:3857)
///
/// Étapes :
/// 1. validation du type de géométrie
/// 2. inversion des axes du ring extérieur (les rings intérieurs sont ignorés)
/// 3. construction puis parsing du littéral WKT, lu dans l'ordre d'axes
///    EPSG de `source_crs` (latitude d'abord en EPSG:4326)
/// 4. reprojection `source_crs` -> EPSG:3857
/// 5. sérialisation WKT
///
/// # Errors
///
/// - `InvalidInput` si le type n'est pas polygonal ou si les positions ne sont pas 2D
/// - `InvalidGeometry` si le littéral est rejeté (ring ouvert, trop court, illisible)
/// - `Projection` si un des CRS n'est pas résolvable
pub fn normalize(
    geom_type: &str,
    rings: &[Vec<Position>],
    source_crs: Epsg,
) -> Result<NormalizedPolygon, GeomError> {
    let keyword = check_geom_type(geom_type)?;

    let outer = rings
        .first()
        .filter(|ring| !ring.is_empty())
        .ok_or_else(|| {
            GeomError::invalid_input(
                "coordinates",
                "[]",
                "coordinates must contain a non-empty outer ring",
            )
        })?;

    let coords = swap_ring(outer)?;
    let source_wkt = polygon_literal(&keyword, &coords);
    check_ring(&coords, &source_wkt)?;
    let geom = authority_to_xy(parse_polygon(&source_wkt)?, source_crs);

    let reprojector = SmartReprojector::new(source_crs, STORAGE_CRS)?;
    let projected = reprojector.transform_geometry(&geom)?;
    let wkt = to_wkt(&projected)?;

    debug!(
        source = %source_crs,
        target = %STORAGE_CRS,
        reprojector = reprojector.description(),
        vertices = coords.len(),
        "Polygon normalized"
    );

    Ok(NormalizedPolygon {
        wkt,
        srid: STORAGE_CRS,
        source_wkt,
    })
}

impl InputPolygon {
    /// Raccourci pour `normalize` sur un polygone déjà validé
    pub fn normalize(&self) -> Result<NormalizedPolygon, GeomError> {
        normalize(&self.geom_type, &self.rings, self.source_crs)
    }
}
