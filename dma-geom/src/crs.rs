//! Identifiants de systèmes de coordonnées (codes EPSG)

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::GeomError;

/// CRS géographiques courants dont l'ordre d'axes EPSG est latitude, longitude
const LATITUDE_FIRST: &[u32] = &[
    4326, // WGS 84
    4258, // ETRS89
    4269, // NAD83
    4267, // NAD27
    4171, // RGF93
    4230, // ED50
    4277, // OSGB36
    4283, // GDA94
    7844, // GDA2020
    4167, // NZGD2000
    4612, // JGD2000
    6668, // JGD2011
    4490, // CGCS2000
    4674, // SIRGAS 2000
];

/// Code EPSG d'un système de coordonnées
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epsg(pub u32);

impl Epsg {
    /// WGS84 géographique, CRS client par défaut
    pub const WGS84: Epsg = Epsg(4326);

    /// Web Mercator, CRS indexé de l'entrepôt
    pub const WEB_MERCATOR: Epsg = Epsg(3857);

    /// UTM 35N, CRS métrique par défaut pour ST_Length
    pub const DEFAULT_MEASUREMENT: Epsg = Epsg(32635);

    pub fn code(self) -> u32 {
        self.0
    }

    /// SRID tel qu'attendu par PostGIS (int4)
    pub fn srid(self) -> i32 {
        self.0 as i32
    }

    /// Vrai si l'autorité EPSG ordonne les axes latitude puis longitude
    ///
    /// Les CRS projetés (3857, UTM...) sont en abscisse puis ordonnée.
    pub fn is_latitude_first(self) -> bool {
        LATITUDE_FIRST.contains(&self.0)
    }

    /// Lit un code EPSG depuis une valeur JSON (entier ou chaîne)
    ///
    /// `field` désigne le champ de la requête, repris dans l'erreur.
    pub fn from_json(field: &'static str, value: &Value) -> Result<Self, GeomError> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .filter(|&c| c > 0 && c <= i32::MAX as u64)
                .map(|c| Epsg(c as u32))
                .ok_or_else(|| {
                    GeomError::invalid_input(field, n.to_string(), format!("{n} is not an EPSG code"))
                }),
            Value::String(s) => s.parse().map_err(|reason: String| {
                GeomError::invalid_input(field, s.clone(), reason)
            }),
            other => Err(GeomError::invalid_input(
                field,
                other.to_string(),
                format!("{other} is not an EPSG code"),
            )),
        }
    }
}

impl fmt::Display for Epsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

fn epsg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?i:epsg:)?(\d{1,9})$").expect("EPSG pattern is a valid regex")
    })
}

impl FromStr for Epsg {
    type Err = String;

    /// Accepte `4326`, `EPSG:4326` ou `epsg:4326`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = epsg_pattern()
            .captures(s.trim())
            .and_then(|c| c[1].parse::<u32>().ok())
            .filter(|&c| c > 0)
            .ok_or_else(|| format!("{s} is not an EPSG code"))?;
        Ok(Epsg(code))
    }
}

impl From<u32> for Epsg {
    fn from(code: u32) -> Self {
        Epsg(code)
    }
}

/// CRS de stockage de l'entrepôt (non configurable)
pub const STORAGE_CRS: Epsg = Epsg::WEB_MERCATOR;
