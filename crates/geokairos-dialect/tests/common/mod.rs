//! Shared fixtures for dialect integration tests

use geokairos_dialect::{AttributeDescriptor, FeatureTypeDescriptor, ValueType};
use geokairos_geometry::{geometry_to_ewkb, parse_wkt, CoordinateReferenceSystem, Geometry, GeometryKind};
use geokairos_testkit::MemoryEngine;

/// `parcels`: an id, a name and two geometry columns
#[allow(dead_code)]
pub fn parcels() -> FeatureTypeDescriptor {
    FeatureTypeDescriptor::new(
        "parcels",
        vec![
            AttributeDescriptor::new("fid", ValueType::Long),
            AttributeDescriptor::new("name", ValueType::String),
            AttributeDescriptor::geometry("boundary", GeometryKind::Polygon)
                .with_crs(CoordinateReferenceSystem::epsg(4326)),
            AttributeDescriptor::geometry("centroid", GeometryKind::Point)
                .with_native_srid(5186)
                .with_dimension(3),
        ],
    )
}

/// An engine session with a transaction already open
#[allow(dead_code)]
pub fn manual_commit_engine() -> MemoryEngine {
    let mut engine = MemoryEngine::new();
    geokairos_types::Connection::set_auto_commit(&mut engine, false).unwrap();
    engine.clear_events();
    engine
}

/// One geometry of each standard subtype
#[allow(dead_code)]
pub fn all_subtypes() -> Vec<Geometry> {
    vec![
        Geometry::Point { x: 127.0276, y: 37.4979 },
        Geometry::LineString { points: vec![(0.0, 0.0), (10.5, 3.25), (20.0, -4.0)] },
        Geometry::Polygon {
            rings: vec![
                vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
                vec![(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 2.0)],
            ],
        },
        Geometry::MultiPoint { points: vec![(1.0, 1.0), (-2.5, 3.0)] },
        Geometry::MultiLineString {
            lines: vec![vec![(0.0, 0.0), (1.0, 1.0)], vec![(5.0, 5.0), (6.0, 7.0), (8.0, 9.0)]],
        },
        Geometry::MultiPolygon {
            polygons: vec![
                vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]],
                vec![vec![(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)]],
            ],
        },
        Geometry::GeometryCollection {
            geometries: vec![
                Geometry::Point { x: 1.0, y: 2.0 },
                Geometry::LineString { points: vec![(3.0, 4.0), (5.0, 6.0)] },
            ],
        },
    ]
}

/// What the engine stores for `ST_GeomFromText('<wkt>', <srid>)`
#[allow(dead_code)]
pub fn store_literal(literal: &str) -> Vec<u8> {
    let body = literal
        .strip_prefix("ST_GeomFromText('")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap();
    let (wkt, srid) = body.rsplit_once("', ").unwrap();
    let geometry = parse_wkt(&wkt.replace("''", "'")).unwrap();
    geometry_to_ewkb(&geometry, srid.trim().parse().unwrap())
}
