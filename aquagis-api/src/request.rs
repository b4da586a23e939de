//! Validation du corps de `/get_dma_resources`

use dma_geom::ring::{check_geom_type, swap_axes};
use dma_geom::{Epsg, InputPolygon};
use geojson::PolygonType;
use serde_json::Value;

use crate::dma::DmaSettings;
use crate::error::DmaError;

/// Requête validée, prête pour la normalisation
#[derive(Debug, Clone)]
pub struct DmaRequest {
    pub polygon: InputPolygon,

    /// CRS métrique pour `ST_Length`
    pub result_crs: Epsg,
}

impl DmaRequest {
    /// Valide le corps JSON avant tout travail géométrique
    ///
    /// Les champs sont contrôlés dans l'ordre `geom_type`, `coordinates`,
    /// `crs`, `result_crs` ; la première erreur est renvoyée.
    pub fn from_json(body: &Value, settings: &DmaSettings) -> Result<Self, DmaError> {
        let object = body
            .as_object()
            .ok_or_else(|| DmaError::input("body", "request body must be a JSON object"))?;

        let geom_type = match object.get("geom_type") {
            Some(Value::String(t)) => t.clone(),
            Some(Value::Null) | None => {
                return Err(DmaError::input("geom_type", "geom_type is required"))
            }
            Some(other) => {
                return Err(DmaError::input(
                    "geom_type",
                    format!("geom_type must be a string, got {other}"),
                ))
            }
        };
        check_geom_type(&geom_type)?;

        let rings = parse_rings(object.get("coordinates"))?;

        let source_crs = optional_crs(object.get("crs"), "crs", settings.default_source_crs)?;
        let result_crs = optional_crs(
            object.get("result_crs"),
            "result_crs",
            settings.default_result_crs,
        )?;

        Ok(Self {
            polygon: InputPolygon {
                geom_type,
                rings,
                source_crs,
            },
            result_crs,
        })
    }
}

fn parse_rings(value: Option<&Value>) -> Result<PolygonType, DmaError> {
    let value = match value {
        Some(Value::Null) | None => {
            return Err(DmaError::input("coordinates", "coordinates are required"))
        }
        Some(v) => v,
    };

    let rings: PolygonType = serde_json::from_value(value.clone()).map_err(|e| {
        DmaError::input(
            "coordinates",
            format!("coordinates must be a list of rings of [x, y] positions: {e}"),
        )
    })?;

    let outer = rings
        .first()
        .filter(|ring| !ring.is_empty())
        .ok_or_else(|| DmaError::input("coordinates", "coordinates must contain a non-empty outer ring"))?;

    for position in outer {
        swap_axes(position)?;
    }

    Ok(rings)
}

fn optional_crs(value: Option<&Value>, field: &'static str, default: Epsg) -> Result<Epsg, DmaError> {
    match value {
        Some(Value::Null) | None => Ok(default),
        Some(v) => Ok(Epsg::from_json(field, v)?),
    }
}
