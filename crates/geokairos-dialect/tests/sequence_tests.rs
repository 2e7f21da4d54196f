//! Sequence-backed primary keys

use geokairos_dialect::{KairosDialect, SequenceKeyProvider, SpatialDialect};
use geokairos_testkit::MemoryEngine;
use geokairos_types::{Connection, ConnectionError, ResultSet, Savepoint};

/// A session whose every query succeeds with no rows
struct EmptyConnection;

impl Connection for EmptyConnection {
    fn query(&mut self, _sql: &str) -> Result<ResultSet, ConnectionError> {
        Ok(ResultSet::empty(vec!["value".to_string()]))
    }

    fn execute(&mut self, _sql: &str) -> Result<u64, ConnectionError> {
        Ok(0)
    }

    fn auto_commit(&self) -> bool {
        true
    }

    fn set_auto_commit(&mut self, _auto_commit: bool) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn set_savepoint(&mut self) -> Result<Savepoint, ConnectionError> {
        Err(ConnectionError::Unsupported("savepoints".to_string()))
    }

    fn rollback_to_savepoint(&mut self, _savepoint: &Savepoint) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn release_savepoint(&mut self, _savepoint: Savepoint) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn server_version(&self) -> Result<(u32, u32), ConnectionError> {
        Ok((5, 0))
    }
}

#[test]
fn test_sequence_lookup() {
    let mut engine = MemoryEngine::new();
    engine.create_sequence("seq_building_fid");
    let dialect = KairosDialect::default();

    assert_eq!(
        dialect.sequence_for_column(&mut engine, "building", "fid").unwrap().as_deref(),
        Some("seq_building_fid")
    );
    assert_eq!(dialect.sequence_for_column(&mut engine, "road", "fid").unwrap(), None);
}

#[test]
fn test_shape_columns_skip_the_lookup() {
    let mut engine = MemoryEngine::new();
    engine.create_sequence("seq_building_the_geom");
    let provider = SequenceKeyProvider::new();

    assert_eq!(provider.sequence_name_for(&mut engine, "building", "the_geom").unwrap(), None);
    assert_eq!(provider.sequence_name_for(&mut engine, "building", "SHAPE").unwrap(), None);
    assert!(engine.statements().is_empty());
}

#[test]
fn test_next_and_last_values() {
    let mut engine = MemoryEngine::new();
    engine.create_sequence("seq_building_fid");
    let dialect = KairosDialect::default();

    assert_eq!(dialect.last_generated_value(&mut engine).unwrap(), None);
    assert_eq!(dialect.next_sequence_value(&mut engine, "seq_building_fid").unwrap(), Some(1));
    assert_eq!(dialect.next_sequence_value(&mut engine, "seq_building_fid").unwrap(), Some(2));
    assert_eq!(dialect.last_generated_value(&mut engine).unwrap(), Some(2));
    assert_eq!(engine.statements()[1], "SELECT \"seq_building_fid\".NEXTVAL FROM DUAL");
}

#[test]
fn test_next_value_without_row_is_unavailable() {
    let provider = SequenceKeyProvider::new();
    assert_eq!(provider.next_value(&mut EmptyConnection, "seq_building_fid").unwrap(), None);
}

#[test]
fn test_next_value_of_missing_sequence_fails() {
    let mut engine = MemoryEngine::new();
    let provider = SequenceKeyProvider::new();
    assert!(provider.next_value(&mut engine, "seq_nothing_fid").is_err());
}
