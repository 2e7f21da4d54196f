//! Geometry model and wire codecs
//!
//! Provides the in-memory geometry values the dialect hands to the host
//! framework, and the two wire formats the engine speaks:
//! - WKB (Well-Known Binary), read from `ST_ASBINARY` projections
//! - WKT (Well-Known Text), written into `ST_GeomFromText` literals and read
//!   back from textual envelopes
//!
//! References:
//! - OGC Simple Features for SQL v1.1.1
//! - ISO/IEC 13249-3:2016 (SQL/MM Part 3)

mod crs;
mod envelope;
mod error;
mod factory;
mod geometry;
pub mod wkb;
pub mod wkt;

pub use crs::CoordinateReferenceSystem;
pub use envelope::{Envelope, ReferencedEnvelope};
pub use error::GeometryError;
pub use factory::{GeometryFactory, PrecisionModel};
pub use geometry::{Geometry, GeometryKind, GeometryWithSrid};
pub use wkb::{geometry_to_ewkb, geometry_to_wkb, WkbReader, MAX_NESTING_DEPTH};
pub use wkt::{parse_wkt, to_wkt};
