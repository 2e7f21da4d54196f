use geokairos_geometry::*;

fn all_subtypes() -> Vec<Geometry> {
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

// ============================================================================
// Text and binary forms agree on every subtype
// ============================================================================

#[test]
fn test_text_then_binary_preserves_every_subtype() {
    let mut reader = WkbReader::new(GeometryFactory::with_srid(4326));
    for geom in all_subtypes() {
        let reparsed = parse_wkt(&to_wkt(&geom)).unwrap();
        let decoded = reader.read(&geometry_to_wkb(&reparsed)).unwrap();
        assert_eq!(decoded.geometry, geom, "subtype {}", geom.geometry_type());
        assert_eq!(decoded.srid, 4326);
    }
}

#[test]
fn test_kind_names_match_wkt_tags() {
    for (geom, kind) in all_subtypes().iter().zip(GeometryKind::SUBTYPES) {
        assert_eq!(geom.kind(), kind);
        assert!(to_wkt(geom).starts_with(kind.name()));
    }
}

// ============================================================================
// Envelopes
// ============================================================================

#[test]
fn test_envelope_of_collection_spans_members() {
    let env = all_subtypes()[6].envelope();
    assert_eq!(env, Envelope::new(1.0, 5.0, 2.0, 6.0));
}

#[test]
fn test_envelope_from_wkt_point_is_degenerate() {
    let env = Envelope::from_wkt("POINT(3 4)").unwrap();
    assert!(!env.is_empty());
    assert_eq!(env.width(), 0.0);
    assert!(env.contains(3.0, 4.0));
}
