//! Geometry literals, binary decoding and envelopes

mod common;

use common::{all_subtypes, store_literal};
use geokairos_dialect::{encode_binary, DialectError, GeometryCodec, KairosDialect, SpatialDialect};
use geokairos_geometry::{
    geometry_to_wkb, Envelope, Geometry, GeometryError, GeometryFactory, MAX_NESTING_DEPTH,
};
use geokairos_types::{Row, SqlValue};

/// Snap coordinates to a 1e-9 grid so equality tolerates float noise
fn snapped(geometry: &Geometry) -> Geometry {
    let mut copy = geometry.clone();
    copy.map_coords_in_place(&|v| (v * 1e9).round() / 1e9);
    copy
}

#[test]
fn test_literal_then_binary_round_trips_every_subtype() {
    let dialect = KairosDialect::default();
    let mut codec = dialect.new_codec();
    let factory = GeometryFactory::with_srid(0);

    for geometry in all_subtypes() {
        let literal = dialect.encode_geometry_value(Some(&geometry), 2, 4326);
        assert!(literal.starts_with("ST_GeomFromText('"), "{}", literal);
        assert!(literal.ends_with("', 4326)"), "{}", literal);

        let row = Row::new(vec![SqlValue::Binary(store_literal(&literal))]);
        let decoded = dialect.decode_geometry(&mut codec, &row, 0, &factory).unwrap().unwrap();
        assert_eq!(decoded.srid, 4326);
        assert_eq!(snapped(&decoded.geometry), snapped(&geometry));
    }
}

#[test]
fn test_ring_round_trips_as_line() {
    let codec = GeometryCodec::new();
    let points = vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 0.0)];
    let literal = codec.encode_literal(Some(&Geometry::LinearRing { points: points.clone() }), 2, 0);

    let mut codec = GeometryCodec::new();
    let row = Row::new(vec![SqlValue::Binary(store_literal(&literal))]);
    let decoded = codec.decode(&row, 0, &GeometryFactory::default()).unwrap().unwrap();
    assert_eq!(decoded.geometry, Geometry::LineString { points });
}

#[test]
fn test_ring_inside_collection_round_trips_as_line() {
    let codec = GeometryCodec::new();
    let points = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)];
    let collection = Geometry::GeometryCollection {
        geometries: vec![Geometry::LinearRing { points: points.clone() }],
    };
    let literal = codec.encode_literal(Some(&collection), 2, 4326);
    assert!(literal.contains("LINESTRING"), "{}", literal);
    assert!(!literal.contains("LINEARRING"), "{}", literal);

    let mut codec = GeometryCodec::new();
    let row = Row::new(vec![SqlValue::Binary(store_literal(&literal))]);
    let decoded = codec.decode(&row, 0, &GeometryFactory::default()).unwrap().unwrap();
    assert_eq!(
        decoded.geometry,
        Geometry::GeometryCollection { geometries: vec![Geometry::LineString { points }] }
    );
}

#[test]
fn test_null_geometry() {
    let dialect = KairosDialect::default();
    assert_eq!(dialect.encode_geometry_value(None, 2, 4326), "NULL");

    let mut codec = dialect.new_codec();
    let row = Row::new(vec![SqlValue::Null]);
    assert_eq!(dialect.decode_geometry(&mut codec, &row, 0, &GeometryFactory::default()).unwrap(), None);
}

#[test]
fn test_corrupt_binary_is_a_decode_error() {
    let mut codec = GeometryCodec::new();
    let row = Row::new(vec![SqlValue::Binary(vec![1, 1, 0])]);
    match codec.decode(&row, 0, &GeometryFactory::default()) {
        Err(DialectError::Decode { source, .. }) => {
            assert!(matches!(source, GeometryError::UnexpectedEof { .. }))
        }
        other => panic!("expected a decode error, got {:?}", other),
    }
}

// ============================================================================
// Envelopes
// ============================================================================

#[test]
fn test_null_envelope_is_empty() {
    let dialect = KairosDialect::default();
    let mut codec = dialect.new_codec();
    let row = Row::new(vec![SqlValue::Null]);
    let envelope = dialect.decode_geometry_envelope(&mut codec, &row, 0).unwrap();
    assert!(envelope.is_empty());
}

#[test]
fn test_envelope_from_text_and_binary() {
    let mut codec = GeometryCodec::new();
    let line = Geometry::LineString { points: vec![(-1.0, 2.0), (3.0, -4.0)] };
    let row = Row::new(vec![
        SqlValue::Varchar("LINESTRING(-1 2, 3 -4)".to_string()),
        SqlValue::Binary(geometry_to_wkb(&line)),
    ]);
    let expected = Envelope::new(-1.0, 3.0, -4.0, 2.0);
    assert_eq!(codec.decode_envelope(&row, 0).unwrap(), expected);
    assert_eq!(codec.decode_envelope(&row, 1).unwrap(), expected);
}

#[test]
fn test_bad_envelope_text_keeps_parse_cause() {
    let mut codec = GeometryCodec::new();
    let row = Row::new(vec![SqlValue::Varchar("POLYGON((0 0, 1".to_string())]);
    match codec.decode_envelope(&row, 0) {
        Err(DialectError::Decode { source: GeometryError::WktParse(_), .. }) => {}
        other => panic!("expected a WKT parse failure, got {:?}", other),
    }
}

#[test]
fn test_deeply_nested_binary_is_a_decode_error() {
    // little-endian collection headers, each holding one child
    let mut bytes = Vec::new();
    for _ in 0..MAX_NESTING_DEPTH * 4 {
        bytes.push(1u8);
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
    }
    bytes.extend_from_slice(&geometry_to_wkb(&Geometry::Point { x: 1.0, y: 1.0 }));

    let mut codec = GeometryCodec::new();
    match codec.envelope_from_wkb(&bytes) {
        Err(DialectError::Decode { source: GeometryError::TooDeep { limit }, .. }) => {
            assert_eq!(limit, MAX_NESTING_DEPTH)
        }
        other => panic!("expected a nesting failure, got {:?}", other),
    }

    let row = Row::new(vec![SqlValue::Binary(bytes)]);
    assert!(matches!(
        codec.decode(&row, 0, &GeometryFactory::default()),
        Err(DialectError::Decode { source: GeometryError::TooDeep { .. }, .. })
    ));
}

// ============================================================================
// Binary literals
// ============================================================================

#[test]
fn test_binary_escape_vector() {
    assert_eq!(encode_binary(&[0x00, 0x27, 0x5C, 0x01]), r"'\000\''\134\001'");
}

#[test]
fn test_binary_value_through_dialect() {
    let dialect = KairosDialect::default();
    assert_eq!(dialect.encode_value(&SqlValue::Binary(vec![b'a', 0xff])), r"'a\377'");
    assert_eq!(dialect.encode_value(&SqlValue::Varchar("it's".to_string())), "'it''s'");
    assert_eq!(dialect.encode_value(&SqlValue::Null), "NULL");
}
