//! Type mapping between semantic value types and native engine types
//!
//! The registry is built once, never mutated, and lent to every consumer.

use std::collections::HashMap;

use geokairos_geometry::GeometryKind;
use geokairos_types::Connection;

use crate::{ColumnMetadata, MetadataResolver};

/// Semantic value types the host framework binds attributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigDecimal,
    Boolean,
    String,
    Bytes,
    Uuid,
    Date,
    Time,
    Timestamp,
    Geometry(GeometryKind),
}

impl ValueType {
    pub fn is_geometry(&self) -> bool {
        matches!(self, ValueType::Geometry(_))
    }

    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        match self {
            ValueType::Geometry(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Native type codes used when binding parameters
///
/// Standard kinds carry their JDBC-compatible code. Geometry subtypes carry
/// engine-internal dispatch codes in the 4000 range, which never appear in
/// driver metadata; the generic geometry type travels as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bit,
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Real,
    Float,
    Double,
    Decimal,
    Numeric,
    Varchar,
    Blob,
    Date,
    Time,
    Timestamp,
    Other,
    Geometry(GeometryKind),
}

/// First geometry dispatch code (POINT)
pub const GEOMETRY_DISPATCH_BASE: i32 = 4000;

impl SqlType {
    pub fn code(&self) -> i32 {
        match self {
            SqlType::Bit => -7,
            SqlType::Boolean => 16,
            SqlType::Smallint => 5,
            SqlType::Integer => 4,
            SqlType::Bigint => -5,
            SqlType::Real => 7,
            SqlType::Float => 6,
            SqlType::Double => 8,
            SqlType::Decimal => 3,
            SqlType::Numeric => 2,
            SqlType::Varchar => 12,
            SqlType::Blob => 2004,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::Other => 1111,
            SqlType::Geometry(GeometryKind::Geometry) => 1111,
            SqlType::Geometry(kind) => GEOMETRY_DISPATCH_BASE + kind.wkb_code() as i32 - 1,
        }
    }

    /// Geometry subtype routed by a dispatch code
    pub fn geometry_kind_for_code(code: i32) -> Option<GeometryKind> {
        let offset = code.checked_sub(GEOMETRY_DISPATCH_BASE)?;
        GeometryKind::from_wkb_code(u32::try_from(offset).ok()? + 1)
    }
}

/// Bidirectional lookup between value types and native types
#[derive(Debug, Clone)]
pub struct TypeMappingRegistry {
    value_to_sql: HashMap<ValueType, SqlType>,
    name_to_value: HashMap<String, ValueType>,
    type_name_overrides: HashMap<i32, &'static str>,
}

impl TypeMappingRegistry {
    pub fn new() -> Self {
        let mut value_to_sql = HashMap::new();
        value_to_sql.insert(ValueType::Short, SqlType::Smallint);
        value_to_sql.insert(ValueType::Integer, SqlType::Integer);
        // the engine has no wider integer column than INTEGER
        value_to_sql.insert(ValueType::Long, SqlType::Integer);
        value_to_sql.insert(ValueType::Float, SqlType::Real);
        value_to_sql.insert(ValueType::Double, SqlType::Double);
        value_to_sql.insert(ValueType::BigDecimal, SqlType::Numeric);
        value_to_sql.insert(ValueType::Boolean, SqlType::Boolean);
        value_to_sql.insert(ValueType::String, SqlType::Varchar);
        value_to_sql.insert(ValueType::Bytes, SqlType::Blob);
        value_to_sql.insert(ValueType::Uuid, SqlType::Other);
        value_to_sql.insert(ValueType::Date, SqlType::Date);
        value_to_sql.insert(ValueType::Time, SqlType::Time);
        value_to_sql.insert(ValueType::Timestamp, SqlType::Timestamp);
        value_to_sql.insert(ValueType::Geometry(GeometryKind::Geometry), SqlType::Other);
        for kind in GeometryKind::SUBTYPES {
            value_to_sql.insert(ValueType::Geometry(kind), SqlType::Geometry(kind));
        }

        let mut name_to_value = HashMap::new();
        let scalar_names: [(&str, ValueType); 20] = [
            ("TEXT", ValueType::String),
            ("VARCHAR", ValueType::String),
            ("CHAR", ValueType::String),
            ("BYTEA", ValueType::Bytes),
            ("BLOB", ValueType::Bytes),
            ("SMALLINT", ValueType::Short),
            ("INTEGER", ValueType::Integer),
            ("INT", ValueType::Integer),
            ("BIGINT", ValueType::Long),
            ("REAL", ValueType::Float),
            ("FLOAT", ValueType::Double),
            ("DOUBLE", ValueType::Double),
            ("DECIMAL", ValueType::BigDecimal),
            ("NUMBER", ValueType::BigDecimal),
            ("BOOL", ValueType::Boolean),
            ("BOOLEAN", ValueType::Boolean),
            ("UUID", ValueType::Uuid),
            ("DATE", ValueType::Date),
            ("TIME", ValueType::Time),
            ("TIMESTAMP", ValueType::Timestamp),
        ];
        for (name, value_type) in scalar_names {
            name_to_value.insert(name.to_string(), value_type);
        }
        name_to_value.insert("GEOMETRY".to_string(), ValueType::Geometry(GeometryKind::Geometry));
        for kind in GeometryKind::SUBTYPES {
            for suffix in ["", "M", "Z"] {
                name_to_value.insert(format!("{}{}", kind.name(), suffix), ValueType::Geometry(kind));
            }
        }
        // catalog spelling written by table registration
        name_to_value.insert(
            "GEOMCOLLECTION".to_string(),
            ValueType::Geometry(GeometryKind::GeometryCollection),
        );

        let type_name_overrides = [
            (SqlType::Bit, "BIT"),
            (SqlType::Varchar, "VARCHAR"),
            (SqlType::Boolean, "BOOL"),
            (SqlType::Smallint, "SMALLINT"),
            (SqlType::Integer, "INTEGER"),
            (SqlType::Bigint, "BIGINT"),
            (SqlType::Real, "REAL"),
            (SqlType::Float, "FLOAT"),
            (SqlType::Double, "DOUBLE"),
            (SqlType::Decimal, "DECIMAL"),
            (SqlType::Numeric, "NUMBER"),
            (SqlType::Blob, "BLOB"),
        ]
        .into_iter()
        .map(|(sql_type, name)| (sql_type.code(), name))
        .collect();

        TypeMappingRegistry { value_to_sql, name_to_value, type_name_overrides }
    }

    /// Native type used to bind values of `value_type`
    pub fn map_value_type_to_native(&self, value_type: &ValueType) -> Option<SqlType> {
        self.value_to_sql.get(value_type).copied()
    }

    /// Value type for a native type name; case-insensitive, an `ST_` prefix
    /// and `M`/`Z`/`ZM` suffixes on geometry names are ignored
    pub fn map_native_name_to_value_type(&self, name: &str) -> Option<ValueType> {
        let upper = name.trim().to_ascii_uppercase();
        if let Some(value_type) = self.name_to_value.get(&upper) {
            return Some(*value_type);
        }
        let unprefixed = upper.strip_prefix("ST_").unwrap_or(&upper);
        let base = unprefixed.strip_suffix("ZM").unwrap_or(unprefixed);
        self.name_to_value.get(base).copied().filter(ValueType::is_geometry)
    }

    /// Value type for an introspected column, or `None` to keep the
    /// framework's default inference
    ///
    /// Generic `geometry` columns are narrowed to the subtype registered in
    /// the spatial catalog, falling back to the generic geometry type.
    pub fn resolve_column_value_type(
        &self,
        column: &ColumnMetadata,
        resolver: &MetadataResolver,
        cx: &mut dyn Connection,
    ) -> Option<ValueType> {
        let generic = ValueType::Geometry(GeometryKind::Geometry);
        if column.type_name.eq_ignore_ascii_case("geometry") {
            let subtype = resolver.resolve_native_subtype(
                cx,
                column.schema.as_deref(),
                &column.table,
                &column.column,
            );
            return Some(
                subtype
                    .and_then(|name| self.map_native_name_to_value_type(&name))
                    .filter(ValueType::is_geometry)
                    .unwrap_or(generic),
            );
        }
        self.map_native_name_to_value_type(&column.type_name).filter(ValueType::is_geometry)
    }

    /// Subtype name written to the geometry-columns catalog
    pub fn catalog_subtype_name(&self, value_type: &ValueType) -> Option<&'static str> {
        match value_type.geometry_kind()? {
            GeometryKind::GeometryCollection => Some("GEOMCOLLECTION"),
            kind => Some(kind.name()),
        }
    }

    /// DDL type name for a native type code, where the engine spells it
    /// differently from the standard
    pub fn sql_type_name_override(&self, code: i32) -> Option<&'static str> {
        self.type_name_overrides.get(&code).copied()
    }

    /// DDL column type for a geometry dispatch code
    ///
    /// The engine stores single lines and polygons in their multi column types.
    pub fn geometry_type_name(&self, code: i32) -> &'static str {
        match SqlType::geometry_kind_for_code(code) {
            Some(GeometryKind::Point) => "ST_POINT",
            Some(GeometryKind::LineString) | Some(GeometryKind::MultiLineString) => {
                "ST_MULTILINESTRING"
            }
            Some(GeometryKind::Polygon) | Some(GeometryKind::MultiPolygon) => "ST_MULTIPOLYGON",
            Some(GeometryKind::MultiPoint) => "ST_MULTIPOINT",
            Some(GeometryKind::GeometryCollection) => "ST_GEOMCOLLECTION",
            Some(GeometryKind::Geometry) | None => "ST_GEOMETRY",
        }
    }
}

impl Default for TypeMappingRegistry {
    fn default() -> Self {
        TypeMappingRegistry::new()
    }
}
