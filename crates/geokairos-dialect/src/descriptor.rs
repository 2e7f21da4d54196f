//! Schema descriptions handed in by the host framework

use geokairos_geometry::{CoordinateReferenceSystem, GeometryKind};

use crate::ValueType;

/// One attribute (column) of a feature type
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub crs: Option<CoordinateReferenceSystem>,
    /// SRID already known to be native for this column; preferred over `crs`
    pub native_srid: Option<i32>,
    pub coordinate_dimension: Option<i32>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        AttributeDescriptor {
            name: name.into(),
            value_type,
            crs: None,
            native_srid: None,
            coordinate_dimension: None,
        }
    }

    pub fn geometry(name: impl Into<String>, kind: GeometryKind) -> Self {
        AttributeDescriptor::new(name, ValueType::Geometry(kind))
    }

    pub fn with_crs(mut self, crs: CoordinateReferenceSystem) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn with_native_srid(mut self, srid: i32) -> Self {
        self.native_srid = Some(srid);
        self
    }

    pub fn with_dimension(mut self, dimension: i32) -> Self {
        self.coordinate_dimension = Some(dimension);
        self
    }

    pub fn is_geometry(&self) -> bool {
        self.value_type.is_geometry()
    }
}

/// A feature type: the table a feature store reads and writes
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTypeDescriptor {
    pub name: String,
    pub attributes: Vec<AttributeDescriptor>,
    /// Primary-key column; the dialect default applies when absent
    pub primary_key: Option<String>,
}

impl FeatureTypeDescriptor {
    pub fn new(name: impl Into<String>, attributes: Vec<AttributeDescriptor>) -> Self {
        FeatureTypeDescriptor { name: name.into(), attributes, primary_key: None }
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    /// Geometry attributes in declaration order
    pub fn geometry_attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|a| a.is_geometry())
    }

    /// The first geometry attribute
    pub fn default_geometry(&self) -> Option<&AttributeDescriptor> {
        self.geometry_attributes().next()
    }
}

/// Column description produced by schema introspection
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
    /// Native type name as reported by the driver
    pub type_name: String,
}

impl ColumnMetadata {
    pub fn new(
        schema: Option<&str>,
        table: impl Into<String>,
        column: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        ColumnMetadata {
            schema: schema.map(str::to_string),
            table: table.into(),
            column: column.into(),
            type_name: type_name.into(),
        }
    }
}
