//! Validation du type de géométrie et préparation du ring extérieur

use geo::Coord;
use geojson::Position;

use crate::GeomError;

/// Marqueur attendu dans le type de géométrie (insensible à la casse)
const POLYGON_MARKER: &str = "polygon";

/// Vérifie que le type de géométrie désigne un polygone
///
/// Retourne le mot-clé WKT en majuscules (`Polygon` -> `POLYGON`).
pub fn check_geom_type(geom_type: &str) -> Result<String, GeomError> {
    if !geom_type.to_lowercase().contains(POLYGON_MARKER) {
        return Err(GeomError::invalid_input(
            "geom_type",
            geom_type,
            format!("{geom_type} is not suitable for DMA zone extraction"),
        ));
    }
    Ok(geom_type.to_uppercase())
}

/// Inverse l'ordre des axes d'une position client
///
/// Les clients envoient des positions GeoJSON (`[lon, lat]` en EPSG:4326) ;
/// le littéral WKT est écrit dans l'ordre d'axes EPSG, latitude d'abord.
/// Seules les positions 2D sont acceptées : en 3D le dernier élément serait
/// l'altitude et l'inversion produirait un point faux.
pub fn swap_axes(position: &[f64]) -> Result<Coord, GeomError> {
    match position {
        [first, second] => Ok(Coord {
            x: *second,
            y: *first,
        }),
        _ => Err(GeomError::invalid_input(
            "coordinates",
            format!("{position:?}"),
            format!(
                "expected 2D positions, got {} ordinates",
                position.len()
            ),
        )),
    }
}

/// Inverse les axes de toutes les positions d'un ring
pub fn swap_ring(ring: &[Position]) -> Result<Vec<Coord>, GeomError> {
    ring.iter().map(|p| swap_axes(p)).collect()
}

/// Vérifie qu'un ring est fermé et possède au moins 4 positions
///
/// `geo::Polygon::new` ferme silencieusement les rings ouverts, la
/// vérification doit donc se faire avant la conversion.
pub fn check_ring(coords: &[Coord], wkt: &str) -> Result<(), GeomError> {
    if coords.len() < 4 {
        return Err(GeomError::invalid_geometry(
            wkt,
            format!(
                "a linear ring needs at least 4 positions, got {}",
                coords.len()
            ),
        ));
    }
    let (first, last) = (coords[0], coords[coords.len() - 1]);
    if first != last {
        return Err(GeomError::invalid_geometry(
            wkt,
            format!(
                "ring is not closed: first ({} {}) != last ({} {})",
                first.x, first.y, last.x, last.y
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geom_type_accepted() {
        assert_eq!(check_geom_type("Polygon").unwrap(), "POLYGON");
        assert_eq!(check_geom_type("POLYGON").unwrap(), "POLYGON");
        assert_eq!(check_geom_type("MultiPolygon").unwrap(), "MULTIPOLYGON");
    }

    #[test]
    fn test_geom_type_rejected() {
        for t in ["Point", "LineString", ""] {
            let err = check_geom_type(t).unwrap_err();
            match err {
                GeomError::InvalidInput {
                    field,
                    value,
                    reason,
                } => {
                    assert_eq!(field, "geom_type");
                    assert_eq!(value, t);
                    assert_eq!(reason, format!("{t} is not suitable for DMA zone extraction"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_swap_is_self_inverse() {
        let c = swap_axes(&[42.7, 23.3]).unwrap();
        assert_eq!((c.x, c.y), (23.3, 42.7));

        let back = swap_axes(&[c.x, c.y]).unwrap();
        assert_eq!((back.x, back.y), (42.7, 23.3));
    }

    #[test]
    fn test_swap_rejects_3d_and_1d() {
        assert!(matches!(
            swap_axes(&[42.7, 23.3, 550.0]),
            Err(GeomError::InvalidInput { field: "coordinates", .. })
        ));
        assert!(swap_axes(&[42.7]).is_err());
    }

    #[test]
    fn test_check_ring() {
        let closed = swap_ring(&[
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ])
        .unwrap();
        assert!(check_ring(&closed, "").is_ok());

        let open = &closed[..3];
        assert!(matches!(
            check_ring(open, ""),
            Err(GeomError::InvalidGeometry { .. })
        ));

        let mut unclosed = closed.clone();
        unclosed.push(Coord { x: 5.0, y: 5.0 });
        assert!(check_ring(&unclosed, "").is_err());
    }
}
