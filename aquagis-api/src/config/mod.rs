//! Configuration du service

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use clap::Args;
use dma_geom::Epsg;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Paramètres du serveur HTTP (arguments ou variables d'environnement)
#[derive(Debug, Clone, Args)]
pub struct ServiceConfig {
    /// Adresse d'écoute
    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port d'écoute
    #[arg(long, env = "APP_PORT", default_value_t = 8088)]
    pub port: u16,

    /// Preset de couches (aquagis) ou chemin vers un JSON
    #[arg(long, env = "AQUAGIS_LAYERS", default_value = "aquagis")]
    pub layers: String,

    /// CRS client par défaut quand `crs` est absent
    #[arg(long, env = "DEFAULT_SOURCE_CRS", default_value = "4326")]
    pub default_crs: Epsg,

    /// CRS de mesure par défaut quand `result_crs` est absent
    #[arg(long, env = "DEFAULT_RESULT_CRS", default_value = "32635")]
    pub default_result_crs: Epsg,
}

impl ServiceConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration des deux couches d'actifs
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayersConfig {
    /// Couche ponctuelle (vannes, compteurs, ...)
    pub point: LayerConfig,

    /// Couche linéaire (conduites)
    pub line: LayerConfig,
}

/// Configuration d'une couche
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerConfig {
    /// Table PostGIS, éventuellement qualifiée (`schema.table`)
    pub table: String,

    /// Colonne géométrique (EPSG:3857)
    #[serde(default = "default_geometry_column")]
    pub geometry_column: String,

    /// Colonne de sous-type servant au regroupement
    #[serde(default = "default_subtype_column")]
    pub subtype_column: String,
}

fn default_geometry_column() -> String {
    "way".to_string()
}

fn default_subtype_column() -> String {
    "aq_type".to_string()
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            point: LayerConfig {
                table: "aquagis_point".into(),
                geometry_column: default_geometry_column(),
                subtype_column: default_subtype_column(),
            },
            line: LayerConfig {
                table: "aquagis_line".into(),
                geometry_column: default_geometry_column(),
                subtype_column: default_subtype_column(),
            },
        }
    }
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("identifier pattern is a valid regex")
    })
}

impl LayersConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read layers file: {}", path.display()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse layers JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "aquagis" => Self::load_embedded(include_str!("presets/aquagis.json")),
            _ => bail!("Unknown preset: {}. Use: aquagis", preset),
        }
    }

    /// Preset si le nom est connu, sinon chemin de fichier
    pub fn resolve(preset_or_path: &str) -> Result<Self> {
        let path = Path::new(preset_or_path);
        if path.extension().is_some_and(|ext| ext == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(preset_or_path)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse embedded layers")?;
        config.validate()?;
        Ok(config)
    }

    /// Vérifie que les identifiants SQL sont sûrs à interpoler
    pub fn validate(&self) -> Result<()> {
        for (layer, cfg) in [("point", &self.point), ("line", &self.line)] {
            for (key, ident) in [
                ("table", &cfg.table),
                ("geometry_column", &cfg.geometry_column),
                ("subtype_column", &cfg.subtype_column),
            ] {
                if !identifier_pattern().is_match(ident) {
                    bail!("Invalid SQL identifier for {}.{}: {:?}", layer, key, ident);
                }
            }
        }
        Ok(())
    }
}
