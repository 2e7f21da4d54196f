//! A feature type's life through the dialect: create, write, read, bound, drop

use geokairos::dialect::{AttributeDescriptor, FeatureTypeDescriptor, TableLifecycle, ValueType};
use geokairos::geometry::{geometry_to_ewkb, parse_wkt, CoordinateReferenceSystem, Envelope, GeometryFactory, GeometryKind};
use geokairos::types::{Connection, Row, SqlValue};
use geokairos::{DialectConfig, KairosDialect, SpatialDialect};
use geokairos_testkit::MemoryEngine;

fn buildings() -> FeatureTypeDescriptor {
    FeatureTypeDescriptor::new(
        "building",
        vec![
            AttributeDescriptor::new("fid", ValueType::Long),
            AttributeDescriptor::new("name", ValueType::String),
            AttributeDescriptor::geometry("footprint", GeometryKind::MultiPolygon)
                .with_crs(CoordinateReferenceSystem::new("urn:ogc:def:crs:EPSG::5186")),
        ],
    )
}

#[test]
fn test_feature_type_lifecycle() {
    let mut engine = MemoryEngine::new();
    engine.create_table("building");
    let dialect =
        KairosDialect::new(DialectConfig { estimated_extents_enabled: true, ..Default::default() });
    let feature_type = buildings();

    assert_eq!(
        dialect.post_create_table(&mut engine, None, &feature_type).unwrap(),
        TableLifecycle::Registered
    );
    assert_eq!(dialect.geometry_srid(&mut engine, None, "building", "footprint"), 5186);
    assert_eq!(dialect.geometry_dimension(&mut engine, None, "building", "footprint"), 2);

    // write: key from the sequence, geometry as a literal the engine stores as EWKB
    let fid = dialect.next_sequence_value(&mut engine, "seq_building_fid").unwrap();
    assert_eq!(fid, Some(1));
    let footprint = parse_wkt("MULTIPOLYGON(((0 0, 20 0, 20 10, 0 10, 0 0)))").unwrap();
    let literal = dialect.encode_geometry_value(Some(&footprint), 2, 5186);
    assert_eq!(
        literal,
        "ST_GeomFromText('MULTIPOLYGON(((0 0, 20 0, 20 10, 0 10, 0 0)))', 5186)"
    );
    engine.insert_geometry("building", "footprint", footprint.clone());
    assert_eq!(
        engine
            .spatial_index("spatial_building_footprint")
            .map(|index| index.locate_in_envelope([5.0, 5.0], [6.0, 6.0])),
        Some(vec![0])
    );

    // read back
    let mut codec = dialect.new_codec();
    let row = Row::new(vec![
        SqlValue::Integer(1),
        SqlValue::Binary(geometry_to_ewkb(&footprint, 5186)),
    ]);
    let decoded = dialect
        .decode_geometry(&mut codec, &row, 1, &GeometryFactory::default())
        .unwrap()
        .unwrap();
    assert_eq!(decoded.geometry, footprint);
    assert_eq!(decoded.srid, 5186);

    // bound
    let bounds = dialect.optimized_bounds(&mut engine, &mut codec, None, &feature_type).unwrap();
    assert_eq!(bounds[0].envelope, Envelope::new(0.0, 20.0, 0.0, 10.0));

    // drop
    assert_eq!(
        dialect.post_drop_table(&mut engine, None, &feature_type).unwrap(),
        TableLifecycle::Unregistered
    );
    assert!(engine.catalog_rows().is_empty());
    assert!(!engine.has_sequence("seq_building_fid"));
    assert!(engine.auto_commit());
}
