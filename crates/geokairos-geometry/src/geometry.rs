use geo::BoundingRect;

use crate::{Envelope, GeometryError};

/// In-memory geometry value
///
/// Coordinates are planar `(x, y)` pairs. `LinearRing` is kept apart from
/// `LineString` because the engine's WKT dialect has no ring construct and
/// callers must know when a rewrite happens.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point { x: f64, y: f64 },
    LineString { points: Vec<(f64, f64)> },
    LinearRing { points: Vec<(f64, f64)> },
    Polygon { rings: Vec<Vec<(f64, f64)>> },
    MultiPoint { points: Vec<(f64, f64)> },
    MultiLineString { lines: Vec<Vec<(f64, f64)>> },
    MultiPolygon { polygons: Vec<Vec<Vec<(f64, f64)>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

/// A geometry tagged with its spatial reference identifier
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryWithSrid {
    pub geometry: Geometry,
    pub srid: i32,
}

impl GeometryWithSrid {
    pub fn new(geometry: Geometry, srid: i32) -> Self {
        GeometryWithSrid { geometry, srid }
    }

    pub fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }
}

/// The seven standard geometry subtypes plus the generic supertype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Geometry,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    /// The seven concrete subtypes, in WKB code order
    pub const SUBTYPES: [GeometryKind; 7] = [
        GeometryKind::Point,
        GeometryKind::LineString,
        GeometryKind::Polygon,
        GeometryKind::MultiPoint,
        GeometryKind::MultiLineString,
        GeometryKind::MultiPolygon,
        GeometryKind::GeometryCollection,
    ];

    /// OGC type name, as used in WKT tags
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Geometry => "GEOMETRY",
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Base WKB type code (0 for the generic supertype)
    pub fn wkb_code(&self) -> u32 {
        match self {
            GeometryKind::Geometry => 0,
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::Polygon => 3,
            GeometryKind::MultiPoint => 4,
            GeometryKind::MultiLineString => 5,
            GeometryKind::MultiPolygon => 6,
            GeometryKind::GeometryCollection => 7,
        }
    }

    pub fn from_wkb_code(code: u32) -> Option<Self> {
        GeometryKind::SUBTYPES.iter().copied().find(|k| k.wkb_code() == code)
    }
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } | Geometry::LinearRing { .. } => GeometryKind::LineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
            Geometry::MultiPoint { .. } => GeometryKind::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryKind::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection { .. } => GeometryKind::GeometryCollection,
        }
    }

    /// Get the type name
    pub fn geometry_type(&self) -> &'static str {
        match self {
            Geometry::LinearRing { .. } => "LINEARRING",
            other => other.kind().name(),
        }
    }

    /// Rewrite closed rings as plain line strings over the same coordinates,
    /// including rings nested in collections; nothing else changes
    pub fn into_open_line(self) -> Geometry {
        match self {
            Geometry::LinearRing { points } => Geometry::LineString { points },
            Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
                geometries: geometries.into_iter().map(Geometry::into_open_line).collect(),
            },
            other => other,
        }
    }

    /// Apply `f` to every coordinate in place
    pub fn map_coords_in_place(&mut self, f: &impl Fn(f64) -> f64) {
        fn apply(points: &mut [(f64, f64)], f: &impl Fn(f64) -> f64) {
            for (x, y) in points.iter_mut() {
                *x = f(*x);
                *y = f(*y);
            }
        }
        match self {
            Geometry::Point { x, y } => {
                *x = f(*x);
                *y = f(*y);
            }
            Geometry::LineString { points }
            | Geometry::LinearRing { points }
            | Geometry::MultiPoint { points } => apply(points, f),
            Geometry::Polygon { rings } => rings.iter_mut().for_each(|r| apply(r, f)),
            Geometry::MultiLineString { lines } => lines.iter_mut().for_each(|l| apply(l, f)),
            Geometry::MultiPolygon { polygons } => polygons
                .iter_mut()
                .for_each(|p| p.iter_mut().for_each(|r| apply(r, f))),
            Geometry::GeometryCollection { geometries } => {
                geometries.iter_mut().for_each(|g| g.map_coords_in_place(f))
            }
        }
    }

    /// Axis-aligned bounding box; empty geometries yield the null envelope
    pub fn envelope(&self) -> Envelope {
        match self.to_geo().bounding_rect() {
            Some(rect) => Envelope::new(rect.min().x, rect.max().x, rect.min().y, rect.max().y),
            None => Envelope::empty(),
        }
    }

    /// Convert to geo::Geometry for spatial algorithms
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        fn line(points: &[(f64, f64)]) -> geo::LineString<f64> {
            geo::LineString(points.iter().map(|(x, y)| geo::Coord { x: *x, y: *y }).collect())
        }
        fn polygon(rings: &[Vec<(f64, f64)>]) -> geo::Polygon<f64> {
            match rings.split_first() {
                Some((exterior, interiors)) => {
                    geo::Polygon::new(line(exterior), interiors.iter().map(|r| line(r)).collect())
                }
                None => geo::Polygon::new(geo::LineString(vec![]), vec![]),
            }
        }

        match self {
            Geometry::Point { x, y } => geo::Geometry::Point(geo::Point::new(*x, *y)),
            Geometry::LineString { points } | Geometry::LinearRing { points } => {
                geo::Geometry::LineString(line(points))
            }
            Geometry::Polygon { rings } => geo::Geometry::Polygon(polygon(rings)),
            Geometry::MultiPoint { points } => geo::Geometry::MultiPoint(geo::MultiPoint(
                points.iter().map(|(x, y)| geo::Point::new(*x, *y)).collect(),
            )),
            Geometry::MultiLineString { lines } => geo::Geometry::MultiLineString(
                geo::MultiLineString(lines.iter().map(|l| line(l)).collect()),
            ),
            Geometry::MultiPolygon { polygons } => geo::Geometry::MultiPolygon(geo::MultiPolygon(
                polygons.iter().map(|p| polygon(p)).collect(),
            )),
            Geometry::GeometryCollection { geometries } => geo::Geometry::GeometryCollection(
                geo::GeometryCollection(geometries.iter().map(Geometry::to_geo).collect()),
            ),
        }
    }

    /// Convert geo::Geometry back to the internal representation
    pub fn from_geo(geom: &geo::Geometry<f64>) -> Result<Geometry, GeometryError> {
        fn coords(ls: &geo::LineString<f64>) -> Vec<(f64, f64)> {
            ls.coords().map(|c| (c.x, c.y)).collect()
        }
        fn rings(poly: &geo::Polygon<f64>) -> Vec<Vec<(f64, f64)>> {
            if poly.exterior().0.is_empty() {
                return Vec::new();
            }
            std::iter::once(poly.exterior()).chain(poly.interiors()).map(coords).collect()
        }

        Ok(match geom {
            geo::Geometry::Point(p) => Geometry::Point { x: p.x(), y: p.y() },
            geo::Geometry::Line(l) => Geometry::LineString {
                points: vec![(l.start.x, l.start.y), (l.end.x, l.end.y)],
            },
            geo::Geometry::LineString(ls) => Geometry::LineString { points: coords(ls) },
            geo::Geometry::Polygon(poly) => Geometry::Polygon { rings: rings(poly) },
            geo::Geometry::MultiPoint(mp) => {
                Geometry::MultiPoint { points: mp.0.iter().map(|p| (p.x(), p.y())).collect() }
            }
            geo::Geometry::MultiLineString(mls) => {
                Geometry::MultiLineString { lines: mls.0.iter().map(coords).collect() }
            }
            geo::Geometry::MultiPolygon(mp) => {
                Geometry::MultiPolygon { polygons: mp.0.iter().map(rings).collect() }
            }
            geo::Geometry::GeometryCollection(gc) => Geometry::GeometryCollection {
                geometries: gc.0.iter().map(Geometry::from_geo).collect::<Result<Vec<_>, _>>()?,
            },
            geo::Geometry::Rect(rect) => Geometry::Polygon { rings: rings(&rect.to_polygon()) },
            geo::Geometry::Triangle(tri) => Geometry::Polygon { rings: rings(&tri.to_polygon()) },
        })
    }
}
