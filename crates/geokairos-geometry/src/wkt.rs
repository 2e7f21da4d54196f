//! WKT (Well-Known Text) reader and writer
//!
//! Parsing goes through the `wkt` crate. Writing produces the compact
//! `TYPE(x y, ...)` form the engine's `ST_GeomFromText` accepts.

use std::str::FromStr;

use crate::{Geometry, GeometryError};

/// Parse WKT (Well-Known Text) format
/// Examples: POINT(1 2), LINESTRING(0 0, 1 1), POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))
pub fn parse_wkt(text: &str) -> Result<Geometry, GeometryError> {
    let parsed: wkt::Wkt<f64> =
        wkt::Wkt::from_str(text.trim()).map_err(|e| GeometryError::WktParse(e.to_string()))?;
    let geom = geo::Geometry::<f64>::try_from(parsed)
        .map_err(|e| GeometryError::WktParse(e.to_string()))?;
    Geometry::from_geo(&geom)
}

fn coords(points: &[(f64, f64)]) -> String {
    points.iter().map(|(x, y)| format!("{} {}", x, y)).collect::<Vec<_>>().join(", ")
}

fn rings(rings: &[Vec<(f64, f64)>]) -> String {
    rings.iter().map(|ring| format!("({})", coords(ring))).collect::<Vec<_>>().join(", ")
}

/// Convert to WKT string
///
/// Empty members are written as `TYPE EMPTY`. Rings are tagged `LINEARRING`,
/// which the engine rejects; rewrite them with `Geometry::into_open_line`
/// before building literals.
pub fn to_wkt(geom: &Geometry) -> String {
    let tag = geom.geometry_type();
    let body = match geom {
        Geometry::Point { x, y } => {
            if x.is_nan() && y.is_nan() {
                String::new()
            } else {
                format!("{} {}", x, y)
            }
        }
        Geometry::LineString { points } | Geometry::LinearRing { points } => coords(points),
        Geometry::MultiPoint { points } => points
            .iter()
            .map(|(x, y)| format!("({} {})", x, y))
            .collect::<Vec<_>>()
            .join(", "),
        Geometry::Polygon { rings: r } => rings(r),
        Geometry::MultiLineString { lines } => rings(lines),
        Geometry::MultiPolygon { polygons } => polygons
            .iter()
            .map(|poly| format!("({})", rings(poly)))
            .collect::<Vec<_>>()
            .join(", "),
        Geometry::GeometryCollection { geometries } => {
            geometries.iter().map(to_wkt).collect::<Vec<_>>().join(", ")
        }
    };

    if body.is_empty() {
        format!("{} EMPTY", tag)
    } else {
        format!("{}({})", tag, body)
    }
}
