//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

use geo::{Coord, Geometry, LineString, Polygon};
use proj::Proj;

use crate::{Epsg, GeomError};

/// Reprojection de géométries entre deux systèmes de coordonnées
pub struct Reprojector {
    proj: Proj,
    source: Epsg,
    target: Epsg,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}

impl Reprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    ///
    /// `new_known_crs` normalise l'ordre des axes (x = longitude, y = latitude).
    pub fn new(source: Epsg, target: Epsg) -> Result<Self, GeomError> {
        let proj = Proj::new_known_crs(&source.to_string(), &target.to_string(), None)
            .map_err(|e| GeomError::projection(source, target, e))?;

        Ok(Self {
            proj,
            source,
            target,
        })
    }

    pub fn source(&self) -> Epsg {
        self.source
    }

    pub fn target(&self) -> Epsg {
        self.target
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, GeomError> {
        match geom {
            Geometry::Polygon(p) => Ok(Geometry::Polygon(self.transform_polygon(p)?)),
            Geometry::LineString(ls) => Ok(Geometry::LineString(self.transform_linestring(ls)?)),
            _ => Err(GeomError::projection(
                self.source,
                self.target,
                "only polygons and linestrings can be reprojected",
            )),
        }
    }

    /// Transforme une LineString (conversion batch)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString, GeomError> {
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .map_err(|e| GeomError::projection(self.source, self.target, e))?;

        // PROJ renvoie inf pour les points hors du domaine de validité
        if let Some((x, y)) = coords.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(GeomError::projection(
                self.source,
                self.target,
                format!("coordinate out of projection bounds ({x}, {y})"),
            ));
        }

        Ok(LineString::new(
            coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        ))
    }

    /// Transforme un Polygon
    fn transform_polygon(&self, p: &Polygon) -> Result<Polygon, GeomError> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}
