//! # dma-geom
//!
//! Normalisation des polygones de zones DMA (District Metered Area) avant
//! interrogation de l'entrepôt spatial.
//!
//! ## Features
//!
//! - Validation du type de géométrie (polygone uniquement)
//! - Inversion des positions GeoJSON `[lon, lat]` vers l'ordre d'axes EPSG
//!   (`lat lon` pour EPSG:4326)
//! - Construction et parsing WKT via `geozero`
//! - Reprojection vers EPSG:3857 : pure Rust pour WGS84, PROJ pour le reste
//!   (feature `reproject`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dma_geom::{normalize, Epsg};
//!
//! let rings = vec![vec![
//!     vec![23.30, 42.68],
//!     vec![23.30, 42.72],
//!     vec![23.34, 42.72],
//!     vec![23.30, 42.68],
//! ]];
//! let polygon = normalize("Polygon", &rings, Epsg::WGS84)?;
//! println!("{} (SRID {})", polygon.wkt, polygon.srid);
//! ```

pub mod crs;
pub mod error;
pub mod normalize;
pub mod reproject;
pub mod ring;
pub mod types;
pub mod wkt;

pub use crs::{Epsg, STORAGE_CRS};
pub use error::GeomError;
pub use normalize::normalize;
pub use reproject::SmartReprojector;
pub use types::{InputPolygon, NormalizedPolygon};
