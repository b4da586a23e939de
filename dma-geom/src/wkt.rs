//! Construction, parsing et sérialisation WKT avec geozero

use geo::{Coord, Geometry};
use geozero::wkt::{Wkt, WktWriter};
use geozero::{GeozeroGeometry, ToGeo};

use crate::GeomError;

/// Assemble le littéral `KEYWORD((x1 y1,x2 y2,...))`
pub fn polygon_literal(keyword: &str, ring: &[Coord]) -> String {
    let pairs: Vec<String> = ring.iter().map(|c| format!("{} {}", c.x, c.y)).collect();
    format!("{}(({}))", keyword, pairs.join(","))
}

/// Parse un littéral WKT polygonal
pub fn parse_polygon(literal: &str) -> Result<Geometry, GeomError> {
    let geom = Wkt(literal)
        .to_geo()
        .map_err(|e| GeomError::invalid_geometry(literal, e.to_string()))?;

    match geom {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Ok(geom),
        _ => Err(GeomError::invalid_geometry(literal, "not a polygon")),
    }
}

/// Sérialise une géométrie en WKT
pub fn to_wkt(geom: &Geometry) -> Result<String, GeomError> {
    let mut wkt_buf = Vec::new();
    {
        let mut writer = WktWriter::new(&mut wkt_buf);
        geom.process_geom(&mut writer)
            .map_err(|e| GeomError::invalid_geometry(format!("{geom:?}"), e.to_string()))?;
    }
    String::from_utf8(wkt_buf)
        .map_err(|e| GeomError::invalid_geometry(format!("{geom:?}"), e.to_string()))
}
