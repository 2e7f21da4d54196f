//! Everything the engine stores; cloned whole for transaction snapshots

use std::collections::BTreeMap;

use geokairos_geometry::Geometry;

use crate::{Predicate, SpatialIndex};

/// A `GEOMETRY_COLUMNS` row
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub catalog: String,
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
    pub dimension: i64,
    pub srid: i64,
    pub geometry_type: String,
}

impl CatalogRow {
    pub fn new(schema: Option<&str>, table: &str, column: &str, srid: i64, geometry_type: &str) -> Self {
        CatalogRow {
            catalog: String::new(),
            schema: schema.map(str::to_string),
            table: table.to_string(),
            column: column.to_string(),
            dimension: 2,
            srid,
            geometry_type: geometry_type.to_string(),
        }
    }

    pub fn with_dimension(mut self, dimension: i64) -> Self {
        self.dimension = dimension;
        self
    }

    /// Text value of a catalog column, `None` for SQL NULL or unknown columns
    pub(crate) fn text(&self, column: &str) -> Option<String> {
        match column.to_ascii_uppercase().as_str() {
            "F_TABLE_CATALOG" => Some(self.catalog.clone()),
            "F_TABLE_SCHEMA" => self.schema.clone(),
            "F_TABLE_NAME" => Some(self.table.clone()),
            "F_GEOMETRY_COLUMN" => Some(self.column.clone()),
            "COORD_DIMENSION" => Some(self.dimension.to_string()),
            "SRID" => Some(self.srid.to_string()),
            "F_GEOMETRY_TYPE" => Some(self.geometry_type.clone()),
            _ => None,
        }
    }

    /// SQL equality over every predicate; a NULL column matches only `IS NULL`
    pub(crate) fn matches(&self, predicates: &[Predicate]) -> bool {
        predicates.iter().all(|(column, value)| self.text(column).as_deref() == value.as_deref())
    }
}

/// Declared storage type reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredColumn {
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
    pub udt_name: String,
}

impl DeclaredColumn {
    pub(crate) fn matches(&self, predicates: &[Predicate]) -> bool {
        predicates.iter().all(|(column, value)| {
            let field = match column.to_ascii_lowercase().as_str() {
                "table_schema" => self.schema.as_deref(),
                "table_name" => Some(self.table.as_str()),
                "column_name" => Some(self.column.as_str()),
                _ => None,
            };
            field == value.as_deref()
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub geometry_columns: Vec<CatalogRow>,
    /// Sequence name to the last value drawn (0 before the first draw)
    pub sequences: BTreeMap<String, i64>,
    pub indexes: BTreeMap<String, SpatialIndex>,
    /// Table name to its geometry columns and their values
    pub tables: BTreeMap<String, BTreeMap<String, Vec<Geometry>>>,
    pub declared_columns: Vec<DeclaredColumn>,
}

impl EngineState {
    /// Append a geometry to `table.column`, keeping that column's indexes current
    pub fn insert_geometry(&mut self, table: &str, column: &str, geometry: Geometry) {
        let values = self
            .tables
            .entry(table.to_string())
            .or_default()
            .entry(column.to_string())
            .or_default();
        let row_id = values.len();
        for index in self.indexes.values_mut() {
            if index.table == table && index.column == column {
                index.insert(row_id, &geometry);
            }
        }
        values.push(geometry);
    }

    pub fn geometries(&self, table: &str, column: &str) -> &[Geometry] {
        self.tables
            .get(table)
            .and_then(|columns| columns.get(column))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
