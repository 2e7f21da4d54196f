//! The dialect capability set and its concrete adapter
//!
//! The host feature-store framework talks to the engine only through
//! `SpatialDialect`. `KairosDialect` is the one implementation; it owns the
//! immutable type registry and configuration and lends them to the
//! components that need them.

use std::path::Path;

use geokairos_geometry::{Envelope, Geometry, GeometryFactory, GeometryWithSrid, ReferencedEnvelope};
use geokairos_types::{Connection, Row, SqlValue};
use log::{debug, warn};

use crate::catalog::{SpatialCatalogSynchronizer, TableLifecycle};
use crate::literal;
use crate::metadata::SYSTEM_TABLES;
use crate::sql;
use crate::{
    BoundsEstimator, ColumnMetadata, DialectConfig, DialectError, FeatureTypeDescriptor,
    GeometryCodec, MetadataResolver, SequenceKeyProvider, SqlType, TypeMappingRegistry, ValueType,
};

/// Oldest engine release the adapter reports
pub const MINIMUM_VERSION: (u32, u32) = (5, 0);

/// Settings handed to the filter-to-SQL encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterEncoderSettings {
    /// Encode BBOX filters as envelope intersection only
    pub loose_bbox_enabled: bool,
}

/// Every hook the host framework calls on a database dialect
pub trait SpatialDialect {
    // Type mapping

    fn map_value_type_to_native(&self, value_type: &ValueType) -> Option<SqlType>;

    fn map_native_name_to_value_type(&self, name: &str) -> Option<ValueType>;

    /// Value type override for an introspected column; `None` keeps the
    /// framework's default inference
    fn resolve_column_value_type(
        &self,
        column: &ColumnMetadata,
        cx: &mut dyn Connection,
    ) -> Option<ValueType>;

    /// Replace the introspected type name with the declared storage type
    fn handle_user_defined_type(&self, column: &mut ColumnMetadata, cx: &mut dyn Connection);

    fn sql_type_name_override(&self, code: i32) -> Option<&'static str>;

    fn geometry_type_name(&self, code: i32) -> &'static str;

    // Geometry encoding

    /// A codec for one worker; codecs must not be shared between workers
    fn new_codec(&self) -> GeometryCodec;

    fn decode_geometry(
        &self,
        codec: &mut GeometryCodec,
        row: &Row,
        column: usize,
        factory: &GeometryFactory,
    ) -> Result<Option<GeometryWithSrid>, DialectError>;

    fn encode_geometry_column(&self, column: &str, prefix: Option<&str>) -> String;

    fn encode_geometry_envelope(&self, column: &str) -> String;

    fn encode_geometry_value(&self, geometry: Option<&Geometry>, dimension: i32, srid: i32)
        -> String;

    fn decode_geometry_envelope(
        &self,
        codec: &mut GeometryCodec,
        row: &Row,
        column: usize,
    ) -> Result<Envelope, DialectError>;

    fn encode_value(&self, value: &SqlValue) -> String;

    // Metadata

    fn geometry_srid(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> i32;

    fn geometry_dimension(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> i32;

    // Keys

    fn sequence_for_column(
        &self,
        cx: &mut dyn Connection,
        table: &str,
        column: &str,
    ) -> Result<Option<String>, DialectError>;

    fn next_sequence_value(
        &self,
        cx: &mut dyn Connection,
        sequence: &str,
    ) -> Result<Option<i64>, DialectError>;

    fn lookup_generated_values_post_insert(&self) -> bool;

    fn last_generated_value(&self, cx: &mut dyn Connection) -> Result<Option<i64>, DialectError>;

    // Bounds

    /// Estimated bounds of the default geometry; `None` when disabled or
    /// unavailable
    fn optimized_bounds(
        &self,
        cx: &mut dyn Connection,
        codec: &mut GeometryCodec,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Option<Vec<ReferencedEnvelope>>;

    // Table lifecycle

    fn post_create_table(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Result<TableLifecycle, DialectError>;

    fn post_drop_table(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Result<TableLifecycle, DialectError>;

    // SQL surface

    fn include_table(&self, schema: Option<&str>, table: &str) -> bool;

    fn encode_column_name(&self, prefix: Option<&str>, raw: &str) -> String;

    fn encode_primary_key(&self, column: &str) -> String;

    fn is_limit_offset_supported(&self) -> bool;

    fn apply_limit_offset(&self, query: &mut String, limit: Option<u64>, offset: u64);

    fn is_aggregated_sort_supported(&self, function: &str) -> bool;

    fn default_varchar_size(&self) -> u32;

    fn desired_table_types(&self) -> &'static [&'static str];

    fn filter_settings(&self) -> FilterEncoderSettings;

    /// Engine release as (major, minor), never below `MINIMUM_VERSION`
    fn database_version(&self, cx: &mut dyn Connection) -> (u32, u32);

    fn supports_geography(&self, cx: &mut dyn Connection) -> bool;
}

/// Dialect for the Kairos spatial engine
#[derive(Debug, Clone, Default)]
pub struct KairosDialect {
    registry: TypeMappingRegistry,
    config: DialectConfig,
    resolver: MetadataResolver,
    sequences: SequenceKeyProvider,
    bounds: BoundsEstimator,
}

impl KairosDialect {
    pub fn new(config: DialectConfig) -> Self {
        KairosDialect {
            registry: TypeMappingRegistry::new(),
            config,
            resolver: MetadataResolver::new(),
            sequences: SequenceKeyProvider::new(),
            bounds: BoundsEstimator::new(),
        }
    }

    /// Build a dialect from a TOML configuration file
    pub fn from_config_file(path: &Path) -> Result<Self, DialectError> {
        let config =
            DialectConfig::load_from(path).map_err(|e| DialectError::Config(format!("{:#}", e)))?;
        Ok(KairosDialect::new(config))
    }

    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeMappingRegistry {
        &self.registry
    }

    fn synchronizer(&self) -> SpatialCatalogSynchronizer<'_> {
        SpatialCatalogSynchronizer::new(&self.registry, &self.config)
    }
}

impl SpatialDialect for KairosDialect {
    fn map_value_type_to_native(&self, value_type: &ValueType) -> Option<SqlType> {
        self.registry.map_value_type_to_native(value_type)
    }

    fn map_native_name_to_value_type(&self, name: &str) -> Option<ValueType> {
        self.registry.map_native_name_to_value_type(name)
    }

    fn resolve_column_value_type(
        &self,
        column: &ColumnMetadata,
        cx: &mut dyn Connection,
    ) -> Option<ValueType> {
        self.registry.resolve_column_value_type(column, &self.resolver, cx)
    }

    fn handle_user_defined_type(&self, column: &mut ColumnMetadata, cx: &mut dyn Connection) {
        let declared = self.resolver.resolve_declared_native_type_name(
            cx,
            column.schema.as_deref(),
            &column.table,
            &column.column,
        );
        if let Some(declared) = declared {
            debug!("{}.{} is declared as {}", column.table, column.column, declared);
            column.type_name = declared;
        }
    }

    fn sql_type_name_override(&self, code: i32) -> Option<&'static str> {
        self.registry.sql_type_name_override(code)
    }

    fn geometry_type_name(&self, code: i32) -> &'static str {
        self.registry.geometry_type_name(code)
    }

    fn new_codec(&self) -> GeometryCodec {
        GeometryCodec::new()
    }

    fn decode_geometry(
        &self,
        codec: &mut GeometryCodec,
        row: &Row,
        column: usize,
        factory: &GeometryFactory,
    ) -> Result<Option<GeometryWithSrid>, DialectError> {
        codec.decode(row, column, factory)
    }

    fn encode_geometry_column(&self, column: &str, prefix: Option<&str>) -> String {
        GeometryCodec::new().encode_column_reference(column, prefix)
    }

    fn encode_geometry_envelope(&self, column: &str) -> String {
        GeometryCodec::new().encode_envelope_reference(column)
    }

    fn encode_geometry_value(
        &self,
        geometry: Option<&Geometry>,
        dimension: i32,
        srid: i32,
    ) -> String {
        GeometryCodec::new().encode_literal(geometry, dimension, srid)
    }

    fn decode_geometry_envelope(
        &self,
        codec: &mut GeometryCodec,
        row: &Row,
        column: usize,
    ) -> Result<Envelope, DialectError> {
        codec.decode_envelope(row, column)
    }

    fn encode_value(&self, value: &SqlValue) -> String {
        literal::encode_value(value)
    }

    fn geometry_srid(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> i32 {
        self.resolver.resolve_srid(cx, schema, table, column)
    }

    fn geometry_dimension(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> i32 {
        self.resolver.resolve_dimension(cx, schema, table, column)
    }

    fn sequence_for_column(
        &self,
        cx: &mut dyn Connection,
        table: &str,
        column: &str,
    ) -> Result<Option<String>, DialectError> {
        self.sequences.sequence_name_for(cx, table, column)
    }

    fn next_sequence_value(
        &self,
        cx: &mut dyn Connection,
        sequence: &str,
    ) -> Result<Option<i64>, DialectError> {
        self.sequences.next_value(cx, sequence)
    }

    fn lookup_generated_values_post_insert(&self) -> bool {
        true
    }

    fn last_generated_value(&self, cx: &mut dyn Connection) -> Result<Option<i64>, DialectError> {
        self.sequences.last_generated_value(cx)
    }

    fn optimized_bounds(
        &self,
        cx: &mut dyn Connection,
        codec: &mut GeometryCodec,
        _schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Option<Vec<ReferencedEnvelope>> {
        if !self.config.estimated_extents_enabled {
            return None;
        }
        let Some(geometry) = feature_type.default_geometry() else {
            debug!("{} has no geometry attribute to estimate", feature_type.name);
            return Some(Vec::new());
        };

        let estimate = self.bounds.estimate(
            cx,
            codec,
            &feature_type.name,
            &geometry.name,
            geometry.crs.as_ref(),
        )?;
        if estimate.envelope.is_empty() {
            Some(Vec::new())
        } else {
            Some(vec![estimate])
        }
    }

    fn post_create_table(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Result<TableLifecycle, DialectError> {
        self.synchronizer().on_table_created(cx, schema, feature_type)
    }

    fn post_drop_table(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureTypeDescriptor,
    ) -> Result<TableLifecycle, DialectError> {
        self.synchronizer().on_table_dropped(cx, schema, feature_type)
    }

    fn include_table(&self, _schema: Option<&str>, table: &str) -> bool {
        !SYSTEM_TABLES.iter().any(|system| system.eq_ignore_ascii_case(table))
    }

    fn encode_column_name(&self, prefix: Option<&str>, raw: &str) -> String {
        sql::encode_column_name(prefix, raw)
    }

    fn encode_primary_key(&self, column: &str) -> String {
        format!("{} INTEGER PRIMARY KEY", sql::quote_identifier(column))
    }

    fn is_limit_offset_supported(&self) -> bool {
        true
    }

    fn apply_limit_offset(&self, query: &mut String, limit: Option<u64>, offset: u64) {
        sql::apply_limit_offset(query, limit, offset)
    }

    fn is_aggregated_sort_supported(&self, function: &str) -> bool {
        function.eq_ignore_ascii_case("distinct")
    }

    fn default_varchar_size(&self) -> u32 {
        self.config.default_varchar_size
    }

    fn desired_table_types(&self) -> &'static [&'static str] {
        &["TABLE", "VIEW", "MATERIALIZED VIEW"]
    }

    fn filter_settings(&self) -> FilterEncoderSettings {
        FilterEncoderSettings { loose_bbox_enabled: self.config.loose_bbox_enabled }
    }

    fn database_version(&self, cx: &mut dyn Connection) -> (u32, u32) {
        match cx.server_version() {
            Ok(version) => version.max(MINIMUM_VERSION),
            Err(e) => {
                warn!("Failed to read the server version, assuming {:?}: {}", MINIMUM_VERSION, e);
                MINIMUM_VERSION
            }
        }
    }

    fn supports_geography(&self, _cx: &mut dyn Connection) -> bool {
        false
    }
}
