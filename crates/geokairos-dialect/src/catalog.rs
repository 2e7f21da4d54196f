//! Spatial catalog synchronization around table creation and drop
//!
//! Registration runs as one unit of work: every geometry attribute gets a
//! delete-then-insert catalog row and a spatial index, then the primary-key
//! sequence is recreated, and only then is the unit committed. Any failure
//! rolls the whole unit back and is returned to the caller.

use geokairos_types::{Connection, ConnectionError, Savepoint};
use log::{debug, info, warn};

use crate::metadata::{
    catalog_predicates, COORD_DIMENSION, DEFAULT_DIMENSION, F_GEOMETRY_COLUMN, F_GEOMETRY_TYPE,
    F_TABLE_CATALOG, F_TABLE_NAME, F_TABLE_SCHEMA, GEOMETRY_COLUMNS, SRID, UNKNOWN_SRID,
};
use crate::sql::{quote_identifier, quote_literal, where_equals};
use crate::{
    AttributeDescriptor, DialectConfig, DialectError, FeatureTypeDescriptor, SequenceKeyProvider,
    TypeMappingRegistry,
};

/// Subtype recorded when the attribute's type has no catalog name
const DEFAULT_SUBTYPE: &str = "GEOMETRY";

/// Where a table stands with respect to the spatial catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLifecycle {
    Uncreated,
    Registering,
    Registered,
    Dropping,
    Unregistered,
}

/// How the unit of work was opened, and so how it must be closed
enum TransactionScope {
    /// The connection was in auto-commit mode; we switched it off
    Owned,
    /// A transaction was already open; we work under a savepoint
    Nested(Savepoint),
}

impl TransactionScope {
    fn begin(cx: &mut dyn Connection) -> Result<Self, ConnectionError> {
        if cx.auto_commit() {
            cx.set_auto_commit(false)?;
            Ok(TransactionScope::Owned)
        } else {
            Ok(TransactionScope::Nested(cx.set_savepoint()?))
        }
    }

    /// Commit the unit; a failed commit rolls the whole transaction back
    fn commit(self, cx: &mut dyn Connection) -> Result<(), ConnectionError> {
        let owned = matches!(self, TransactionScope::Owned);
        let outcome = match self {
            TransactionScope::Owned => cx.commit(),
            TransactionScope::Nested(savepoint) => {
                cx.release_savepoint(savepoint).and_then(|()| cx.commit())
            }
        };
        if let Err(e) = outcome {
            if let Err(rollback) = cx.rollback() {
                warn!("Failed to roll back after commit failure: {}", rollback);
            }
            if owned {
                if let Err(restore) = cx.set_auto_commit(true) {
                    warn!("Failed to restore auto-commit: {}", restore);
                }
            }
            return Err(e);
        }
        if owned {
            cx.set_auto_commit(true)?;
        }
        Ok(())
    }

    /// Undo everything done in the scope; failures here are logged only
    fn abort(self, cx: &mut dyn Connection) {
        match self {
            TransactionScope::Owned => {
                if let Err(e) = cx.rollback() {
                    warn!("Failed to roll back catalog registration: {}", e);
                }
                if let Err(e) = cx.set_auto_commit(true) {
                    warn!("Failed to restore auto-commit: {}", e);
                }
            }
            TransactionScope::Nested(savepoint) => {
                if let Err(e) = cx.rollback_to_savepoint(&savepoint) {
                    warn!("Failed to roll back to savepoint {}: {}", savepoint.name, e);
                }
                let name = savepoint.name.clone();
                if let Err(e) = cx.release_savepoint(savepoint) {
                    warn!("Failed to release savepoint {}: {}", name, e);
                }
            }
        }
    }
}

/// Keeps `GEOMETRY_COLUMNS`, spatial indexes and key sequences in step with
/// the feature tables
pub struct SpatialCatalogSynchronizer<'a> {
    registry: &'a TypeMappingRegistry,
    config: &'a DialectConfig,
    sequences: SequenceKeyProvider,
}

impl<'a> SpatialCatalogSynchronizer<'a> {
    pub fn new(registry: &'a TypeMappingRegistry, config: &'a DialectConfig) -> Self {
        SpatialCatalogSynchronizer { registry, config, sequences: SequenceKeyProvider::new() }
    }

    /// Register every geometry attribute of a freshly created table
    pub fn on_table_created(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Result<TableLifecycle, DialectError> {
        let table = feature_type.name.as_str();
        if feature_type.default_geometry().is_none() {
            debug!("{} has no geometry attributes, nothing to register", table);
            return Ok(TableLifecycle::Registered);
        }
        debug!("{}: {:?} -> {:?}", table, TableLifecycle::Uncreated, TableLifecycle::Registering);

        let scope =
            TransactionScope::begin(cx).map_err(|e| DialectError::catalog(table, e))?;

        let result = match self.register(cx, schema, feature_type) {
            Ok(()) => scope.commit(cx).map_err(DialectError::from),
            Err(e) => {
                scope.abort(cx);
                Err(e)
            }
        };

        match result {
            Ok(()) => {
                info!("Registered spatial catalog entries for table {}", table);
                Ok(TableLifecycle::Registered)
            }
            Err(e) => {
                warn!("Spatial catalog registration of table {} rolled back: {}", table, e);
                Err(catalog_failure(table, e))
            }
        }
    }

    /// Remove the table's catalog registrations and, when configured, its
    /// key sequence
    ///
    /// Spatial indexes go away with the table itself.
    pub fn on_table_dropped(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Result<TableLifecycle, DialectError> {
        let table = feature_type.name.as_str();
        debug!("{}: {:?} -> {:?}", table, TableLifecycle::Registered, TableLifecycle::Dropping);

        let predicates = [(F_TABLE_NAME, Some(table)), (F_TABLE_SCHEMA, schema)];
        let sql = format!("DELETE FROM {} WHERE {}", GEOMETRY_COLUMNS, where_equals(&predicates));
        debug!("{}", sql);
        cx.execute(&sql).map_err(|e| DialectError::catalog(table, e))?;

        if self.config.drop_sequences_on_table_drop {
            let column = self.primary_key_column(feature_type);
            if let Some(sequence) = self.existing_sequence(cx, table, column)? {
                let sql = self.sequences.drop_sequence_sql(&sequence);
                debug!("{}", sql);
                cx.execute(&sql).map_err(|e| DialectError::catalog(table, e))?;
            }
        }

        info!("Removed spatial catalog entries for table {}", table);
        Ok(TableLifecycle::Unregistered)
    }

    fn register(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Result<(), DialectError> {
        let table = feature_type.name.as_str();
        for attribute in feature_type.geometry_attributes() {
            self.register_attribute(cx, schema, table, attribute)?;
        }

        let column = self.primary_key_column(feature_type);
        let sequence = self.sequences.sequence_name_for(cx, table, column)?;
        if let Some(sequence) = sequence {
            let sql = self.sequences.drop_sequence_sql(&sequence);
            debug!("{}", sql);
            cx.execute(&sql)?;
        }
        if let Some(sequence) = self.sequences.sequence_name(table, column) {
            let sql = self.sequences.create_sequence_sql(&sequence);
            debug!("{}", sql);
            cx.execute(&sql)?;
        }
        Ok(())
    }

    fn register_attribute(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        attribute: &AttributeDescriptor,
    ) -> Result<(), ConnectionError> {
        let column = attribute.name.as_str();
        let srid = self.registration_srid(attribute);
        let dimension = attribute.coordinate_dimension.unwrap_or(DEFAULT_DIMENSION);
        let subtype = self
            .registry
            .catalog_subtype_name(&attribute.value_type)
            .unwrap_or(DEFAULT_SUBTYPE);

        let sql = format!(
            "DELETE FROM {} WHERE {} = '' AND {}",
            GEOMETRY_COLUMNS,
            F_TABLE_CATALOG,
            catalog_predicates(schema, table, column)
        );
        debug!("{}", sql);
        cx.execute(&sql)?;

        let sql = format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}) VALUES ('', {}, {}, {}, {}, {}, {})",
            GEOMETRY_COLUMNS,
            F_TABLE_CATALOG,
            F_TABLE_SCHEMA,
            F_TABLE_NAME,
            F_GEOMETRY_COLUMN,
            COORD_DIMENSION,
            SRID,
            F_GEOMETRY_TYPE,
            schema.map(quote_literal).unwrap_or_else(|| "NULL".to_string()),
            quote_literal(table),
            quote_literal(column),
            dimension,
            srid,
            quote_literal(subtype)
        );
        debug!("{}", sql);
        cx.execute(&sql)?;

        let sql = format!(
            "CREATE RSTREE INDEX {} ON {} ({})",
            quote_identifier(&spatial_index_name(table, column)),
            quote_identifier(table),
            quote_identifier(column)
        );
        debug!("{}", sql);
        cx.execute(&sql)?;
        Ok(())
    }

    /// Native SRID hint, else the CRS's EPSG code, else unknown
    fn registration_srid(&self, attribute: &AttributeDescriptor) -> i32 {
        if let Some(srid) = attribute.native_srid {
            return srid;
        }
        match attribute.crs.as_ref() {
            Some(crs) => crs.lookup_epsg_code().unwrap_or_else(|| {
                debug!("No EPSG code for {}, assuming {}", crs.identifier(), UNKNOWN_SRID);
                UNKNOWN_SRID
            }),
            None => UNKNOWN_SRID,
        }
    }

    fn primary_key_column<'f>(&'f self, feature_type: &'f FeatureTypeDescriptor) -> &'f str {
        feature_type.primary_key.as_deref().unwrap_or(&self.config.primary_key_column)
    }

    fn existing_sequence(
        &self,
        cx: &mut dyn Connection,
        table: &str,
        column: &str,
    ) -> Result<Option<String>, DialectError> {
        self.sequences.sequence_name_for(cx, table, column).map_err(|e| catalog_failure(table, e))
    }
}

/// Deterministic name of the spatial index on `table.column`
pub fn spatial_index_name(table: &str, column: &str) -> String {
    format!("spatial_{}_{}", table, column)
}

/// Engine failures become catalog errors for `table`; other errors keep their type
fn catalog_failure(table: &str, e: DialectError) -> DialectError {
    match e {
        DialectError::Connection(source) => DialectError::catalog(table, source),
        other => other,
    }
}
