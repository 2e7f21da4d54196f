//! Spatial catalog lookups
//!
//! Every lookup degrades to a documented default instead of failing: the
//! catalog may be missing, unreadable or simply not list the column.

use geokairos_types::{Connection, ResultSet};
use log::{debug, warn};

use crate::sql::where_equals;

/// Geometry column registrations
pub const GEOMETRY_COLUMNS: &str = "GEOMETRY_COLUMNS";
/// Spatial reference systems known to the engine
pub const SPATIAL_REF_SYS: &str = "SPATIAL_REF_SYS";
/// Engine plan-view system table
pub const SYS_PLAN_VIEW: &str = "SYS_PLAN_VIEW";

/// Catalog tables hidden from generic schema discovery
pub const SYSTEM_TABLES: [&str; 3] = [GEOMETRY_COLUMNS, SPATIAL_REF_SYS, SYS_PLAN_VIEW];

pub(crate) const F_TABLE_CATALOG: &str = "F_TABLE_CATALOG";
pub(crate) const F_TABLE_SCHEMA: &str = "F_TABLE_SCHEMA";
pub(crate) const F_TABLE_NAME: &str = "F_TABLE_NAME";
pub(crate) const F_GEOMETRY_COLUMN: &str = "F_GEOMETRY_COLUMN";
pub(crate) const COORD_DIMENSION: &str = "COORD_DIMENSION";
pub(crate) const SRID: &str = "SRID";
pub(crate) const F_GEOMETRY_TYPE: &str = "F_GEOMETRY_TYPE";

/// SRID reported when the catalog has none
pub const UNKNOWN_SRID: i32 = -1;
/// Coordinate dimension reported when the catalog has none
pub const DEFAULT_DIMENSION: i32 = 2;

/// Resolves per-column spatial metadata from the catalog tables
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataResolver;

impl MetadataResolver {
    pub fn new() -> Self {
        MetadataResolver
    }

    /// Registered SRID, or -1
    pub fn resolve_srid(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> i32 {
        self.lookup_catalog(cx, SRID, schema, table, column)
            .and_then(|rs| rs.first().and_then(|row| row.get_i64(0)))
            .and_then(|srid| i32::try_from(srid).ok())
            .unwrap_or(UNKNOWN_SRID)
    }

    /// Registered coordinate dimension, or 2
    pub fn resolve_dimension(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> i32 {
        self.lookup_catalog(cx, COORD_DIMENSION, schema, table, column)
            .and_then(|rs| rs.first().and_then(|row| row.get_i64(0)))
            .and_then(|dimension| i32::try_from(dimension).ok())
            .unwrap_or(DEFAULT_DIMENSION)
    }

    /// Registered geometry subtype name (e.g. `POINT`), if any
    pub fn resolve_native_subtype(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Option<String> {
        self.lookup_catalog(cx, F_GEOMETRY_TYPE, schema, table, column)
            .and_then(|rs| rs.first().and_then(|row| row.get_string(0)))
    }

    /// Declared storage type of a column, used to see through user-defined
    /// and aliased types
    pub fn resolve_declared_native_type_name(
        &self,
        cx: &mut dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Option<String> {
        let mut predicates = Vec::with_capacity(3);
        if let Some(schema) = schema {
            predicates.push(("table_schema", Some(schema)));
        }
        predicates.push(("table_name", Some(table)));
        predicates.push(("column_name", Some(column)));
        let sql = format!(
            "SELECT udt_name FROM information_schema.columns WHERE {}",
            where_equals(&predicates)
        );
        debug!("Declared type check; {}", sql);

        match cx.query(&sql) {
            Ok(rs) => rs.first().and_then(|row| row.get_string(0)),
            Err(e) => {
                warn!(
                    "Failed to retrieve the declared type of {}.{}.{}: {}",
                    schema.unwrap_or(""),
                    table,
                    column,
                    e
                );
                None
            }
        }
    }

    fn lookup_catalog(
        &self,
        cx: &mut dyn Connection,
        field: &str,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Option<ResultSet> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            field,
            GEOMETRY_COLUMNS,
            catalog_predicates(schema, table, column)
        );
        debug!("Geometry {} check; {}", field.to_ascii_lowercase(), sql);

        match cx.query(&sql) {
            Ok(rs) => Some(rs),
            Err(e) => {
                warn!(
                    "Failed to retrieve {} of {}.{}.{} from the {} table: {}",
                    field,
                    schema.unwrap_or(""),
                    table,
                    column,
                    GEOMETRY_COLUMNS,
                    e
                );
                None
            }
        }
    }
}

/// Exact-match predicates on (schema, table, column); no schema matches rows
/// registered without one
pub(crate) fn catalog_predicates(schema: Option<&str>, table: &str, column: &str) -> String {
    where_equals(&[
        (F_TABLE_SCHEMA, schema),
        (F_TABLE_NAME, Some(table)),
        (F_GEOMETRY_COLUMN, Some(column)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_predicates() {
        assert_eq!(
            catalog_predicates(Some("public"), "roads", "geom"),
            "F_TABLE_SCHEMA = 'public' AND F_TABLE_NAME = 'roads' AND F_GEOMETRY_COLUMN = 'geom'"
        );
        assert_eq!(
            catalog_predicates(None, "o'neil", "geom"),
            "F_TABLE_SCHEMA IS NULL AND F_TABLE_NAME = 'o''neil' AND F_GEOMETRY_COLUMN = 'geom'"
        );
    }
}
