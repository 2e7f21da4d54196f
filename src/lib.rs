//! GeoKairos - Spatial SQL dialect adapter for the Kairos database engine
//!
//! This is the root crate that re-exports all components.

pub use geokairos_dialect as dialect;
pub use geokairos_geometry as geometry;
pub use geokairos_types as types;

pub use geokairos_dialect::{DialectConfig, DialectError, KairosDialect, SpatialDialect};
