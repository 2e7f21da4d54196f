//! The dialect's SQL surface and configuration

use std::io::Write;

use geokairos_dialect::{
    DialectError, KairosDialect, SpatialDialect, SqlType, ValueType, MINIMUM_VERSION,
};
use geokairos_geometry::GeometryKind;
use geokairos_testkit::MemoryEngine;

#[test]
fn test_database_version_floor() {
    let dialect = KairosDialect::default();
    let mut engine = MemoryEngine::new();

    engine.set_server_version(Some((6, 2)));
    assert_eq!(dialect.database_version(&mut engine), (6, 2));

    engine.set_server_version(Some((4, 9)));
    assert_eq!(dialect.database_version(&mut engine), MINIMUM_VERSION);

    engine.set_server_version(None);
    assert_eq!(dialect.database_version(&mut engine), (5, 0));
    assert!(!dialect.supports_geography(&mut engine));
}

#[test]
fn test_value_type_binding() {
    let dialect = KairosDialect::default();
    assert_eq!(dialect.map_value_type_to_native(&ValueType::Long), Some(SqlType::Integer));
    assert_eq!(
        dialect
            .map_value_type_to_native(&ValueType::Geometry(GeometryKind::MultiLineString))
            .map(|t| t.code()),
        Some(4004)
    );
    assert_eq!(dialect.geometry_type_name(4001), "ST_MULTILINESTRING");
    assert_eq!(dialect.sql_type_name_override(SqlType::Blob.code()), Some("BLOB"));
}

#[test]
fn test_column_fragments() {
    let dialect = KairosDialect::default();
    assert_eq!(dialect.encode_column_name(Some("a"), "geom"), "\"a\".\"geom\"");
    assert_eq!(dialect.encode_geometry_column("geom", Some("a")), "ST_ASBINARY(\"a\".\"geom\")");
    assert_eq!(dialect.encode_geometry_envelope("geom"), "ST_ASBINARY(ST_ENVELOPE(\"geom\"))");

    let mut sql = String::from("SELECT * FROM \"roads\"");
    dialect.apply_limit_offset(&mut sql, Some(50), 100);
    assert_eq!(sql, "SELECT * FROM \"roads\" LIMIT 50 OFFSET 100");
}

#[test]
fn test_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "loose_bbox_enabled = true").unwrap();
    writeln!(file, "default_varchar_size = 1024").unwrap();

    let dialect = KairosDialect::from_config_file(file.path()).unwrap();
    assert!(dialect.filter_settings().loose_bbox_enabled);
    assert_eq!(dialect.default_varchar_size(), 1024);
    assert!(dialect.config().drop_sequences_on_table_drop);
}

#[test]
fn test_bad_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "primary_key_column = \"\"").unwrap();

    match KairosDialect::from_config_file(file.path()) {
        Err(DialectError::Config(message)) => assert!(message.contains("primary_key_column")),
        other => panic!("expected a config error, got {:?}", other),
    }
}
