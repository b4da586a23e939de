//! Construction des requêtes spatiales d'agrégation
//!
//! Le polygone et les SRID sont toujours passés en paramètres liés
//! (`$1` WKT, `$2` SRID de stockage, `$3` SRID de mesure). Seuls les noms
//! de tables et de colonnes, validés au chargement de la configuration,
//! sont interpolés dans le SQL.
//!
//! Chaque paramètre est typé explicitement : `ST_Transform` existe en
//! `(geometry, integer)` et `(geometry, text)`, un `$3` nu serait inféré
//! `text` et refuserait l'`i32` lié.

use std::fmt;

use dma_geom::{Epsg, NormalizedPolygon};
use serde::Serialize;
use tokio_postgres::types::ToSql;

use crate::config::{LayerConfig, LayersConfig};

/// Les trois agrégations calculées pour une zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Points entièrement dans la zone
    PointsWithin,
    /// Lignes touchant ou traversant la zone
    LinesIntersecting,
    /// Lignes entièrement dans la zone
    LinesWithin,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [
        QueryKind::PointsWithin,
        QueryKind::LinesIntersecting,
        QueryKind::LinesWithin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::PointsWithin => "points_within",
            QueryKind::LinesIntersecting => "lines_intersecting",
            QueryKind::LinesWithin => "lines_within",
        }
    }

    /// Les requêtes sur les lignes renvoient une colonne `length`
    pub fn has_length(self) -> bool {
        !matches!(self, QueryKind::PointsWithin)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requête SQL prête à exécuter avec ses paramètres
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialQuery {
    pub kind: QueryKind,
    pub sql: String,
    /// `$1` : polygone WKT dans le CRS de stockage
    pub wkt: String,
    /// `$2` : SRID de stockage
    pub storage_srid: i32,
    /// `$3` : SRID métrique pour `ST_Length` (lignes uniquement)
    pub measurement_srid: Option<i32>,
}

impl SpatialQuery {
    /// Paramètres liés, dans l'ordre `$1`, `$2`, `$3`
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&self.wkt, &self.storage_srid];
        if let Some(srid) = &self.measurement_srid {
            params.push(srid);
        }
        params
    }
}

/// Points dont la géométrie est dans le polygone, groupés par sous-type
pub fn points_within(layer: &LayerConfig, wkt: &str, storage_crs: Epsg) -> SpatialQuery {
    let sql = format!(
        r#"
        SELECT a.{subtype}::text AS aquagis_type, count(1) AS objects_count
        FROM {table} a
        WHERE ST_Within(a.{geom}, ST_GeomFromText($1::text, $2::int4))
        GROUP BY a.{subtype}
        ORDER BY aquagis_type
        "#,
        subtype = layer.subtype_column,
        table = layer.table,
        geom = layer.geometry_column,
    );

    SpatialQuery {
        kind: QueryKind::PointsWithin,
        sql,
        wkt: wkt.to_string(),
        storage_srid: storage_crs.srid(),
        measurement_srid: None,
    }
}

/// Lignes intersectant le polygone, avec longueur cumulée
pub fn lines_intersecting(
    layer: &LayerConfig,
    wkt: &str,
    storage_crs: Epsg,
    measurement_crs: Epsg,
) -> SpatialQuery {
    line_query(
        QueryKind::LinesIntersecting,
        "ST_Intersects",
        layer,
        wkt,
        storage_crs,
        measurement_crs,
    )
}

/// Lignes entièrement contenues dans le polygone, avec longueur cumulée
pub fn lines_within(
    layer: &LayerConfig,
    wkt: &str,
    storage_crs: Epsg,
    measurement_crs: Epsg,
) -> SpatialQuery {
    line_query(
        QueryKind::LinesWithin,
        "ST_Within",
        layer,
        wkt,
        storage_crs,
        measurement_crs,
    )
}

/// La longueur est mesurée après transformation vers `measurement_crs` :
/// en EPSG:3857 les distances sont fortement dilatées hors de l'équateur.
fn line_query(
    kind: QueryKind,
    predicate: &str,
    layer: &LayerConfig,
    wkt: &str,
    storage_crs: Epsg,
    measurement_crs: Epsg,
) -> SpatialQuery {
    let sql = format!(
        r#"
        SELECT a.{subtype}::text AS aquagis_type,
               count(1) AS objects_count,
               sum(ST_Length(ST_Transform(a.{geom}, $3::int4)))::float8 AS length
        FROM {table} a
        WHERE {predicate}(a.{geom}, ST_GeomFromText($1::text, $2::int4))
        GROUP BY a.{subtype}
        ORDER BY aquagis_type
        "#,
        subtype = layer.subtype_column,
        table = layer.table,
        geom = layer.geometry_column,
    );

    SpatialQuery {
        kind,
        sql,
        wkt: wkt.to_string(),
        storage_srid: storage_crs.srid(),
        measurement_srid: Some(measurement_crs.srid()),
    }
}

/// Construit les trois requêtes d'une zone, dans l'ordre d'exécution
pub fn build_all(
    layers: &LayersConfig,
    polygon: &NormalizedPolygon,
    measurement_crs: Epsg,
) -> [SpatialQuery; 3] {
    [
        points_within(&layers.point, &polygon.wkt, polygon.srid),
        lines_intersecting(&layers.line, &polygon.wkt, polygon.srid, measurement_crs),
        lines_within(&layers.line, &polygon.wkt, polygon.srid, measurement_crs),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use dma_geom::STORAGE_CRS;

    fn polygon(wkt: &str) -> NormalizedPolygon {
        NormalizedPolygon {
            wkt: wkt.to_string(),
            srid: STORAGE_CRS,
            source_wkt: String::new(),
        }
    }

    #[test]
    fn test_points_within() {
        let layers = LayersConfig::default();
        let q = points_within(&layers.point, "POLYGON((0 0,1 0,1 1,0 0))", STORAGE_CRS);

        assert_eq!(q.kind, QueryKind::PointsWithin);
        assert!(q.sql.contains("FROM aquagis_point a"), "{}", q.sql);
        assert!(
            q.sql.contains("ST_Within(a.way, ST_GeomFromText($1::text, $2::int4))"),
            "{}",
            q.sql
        );
        assert!(q.sql.contains("GROUP BY a.aq_type"), "{}", q.sql);
        assert!(!q.sql.contains("ST_Length"));
        assert!(!q.sql.contains("$3"));
        assert_eq!(q.storage_srid, 3857);
        assert_eq!(q.measurement_srid, None);
    }

    #[test]
    fn test_line_predicates_differ() {
        let layers = LayersConfig::default();
        let [_, intersecting, within] = build_all(
            &layers,
            &polygon("POLYGON((0 0,1 0,1 1,0 0))"),
            Epsg::DEFAULT_MEASUREMENT,
        );

        assert!(intersecting.sql.contains("ST_Intersects(a.way"));
        assert!(!intersecting.sql.contains("ST_Within"));
        assert!(within.sql.contains("ST_Within(a.way"));
        assert!(!within.sql.contains("ST_Intersects"));

        for q in [&intersecting, &within] {
            assert!(q.sql.contains("FROM aquagis_line a"));
            assert!(q.sql.contains("sum(ST_Length(ST_Transform(a.way, $3::int4)))"));
            assert_eq!(q.measurement_srid, Some(32635));
        }
    }

    #[test]
    fn test_polygon_is_never_interpolated() {
        let layers = LayersConfig::default();
        let hostile = "POLYGON((0 0,1 1,0 0))', 3857)); DROP TABLE aquagis_point; --";

        for q in build_all(&layers, &polygon(hostile), Epsg(32634)) {
            assert!(!q.sql.contains("DROP TABLE"), "{}", q.sql);
            assert!(!q.sql.contains("POLYGON"), "{}", q.sql);
            assert!(!q.sql.contains("32634"), "{}", q.sql);
            assert_eq!(q.wkt, hostile);
        }
    }

    /// Chaque `$n` du SQL doit porter un cast correspondant au type lié
    #[test]
    fn test_placeholders_are_typed() {
        let layers = LayersConfig::default();
        let expected = ["$1::text", "$2::int4", "$3::int4"];

        for q in build_all(&layers, &polygon("POLYGON EMPTY"), Epsg(32635)) {
            let params = q.params();
            let placeholders = q.sql.matches('$').count();
            assert_eq!(placeholders, params.len(), "{}: {}", q.kind, q.sql);

            for cast in &expected[..params.len()] {
                assert_eq!(q.sql.matches(cast).count(), 1, "{}: missing {cast}", q.kind);
            }
        }
    }

    #[test]
    fn test_params_match_types() {
        use tokio_postgres::types::Type;

        let layers = LayersConfig::default();
        let [points, intersecting, _] =
            build_all(&layers, &polygon("POLYGON EMPTY"), Epsg(32635));

        let types = [Type::TEXT, Type::INT4, Type::INT4];
        for q in [&points, &intersecting] {
            for (param, ty) in q.params().iter().zip(&types) {
                let mut buf = Default::default();
                assert!(
                    param.to_sql_checked(ty, &mut buf).is_ok(),
                    "{}: {ty}",
                    q.kind
                );
            }
        }
        assert_eq!(points.params().len(), 2);
        assert_eq!(intersecting.params().len(), 3);
    }

    #[test]
    fn test_build_all_order() {
        let layers = LayersConfig::default();
        let kinds: Vec<QueryKind> = build_all(&layers, &polygon("POLYGON EMPTY"), Epsg(32635))
            .iter()
            .map(|q| q.kind)
            .collect();
        assert_eq!(kinds, QueryKind::ALL.to_vec());
    }
}
