//! Sequence-backed primary keys
//!
//! Sequences are named `seq_<table>_<column>`. Columns whose name says they
//! hold a geometry or shape never get one.

use geokairos_types::Connection;
use log::{debug, warn};

use crate::sql::{quote_identifier, quote_literal};
use crate::DialectError;

#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceKeyProvider;

impl SequenceKeyProvider {
    pub fn new() -> Self {
        SequenceKeyProvider
    }

    /// True for geometry/shape columns, which are never sequence-backed
    pub fn is_shape_column(&self, column: &str) -> bool {
        let upper = column.to_ascii_uppercase();
        upper.contains("GEOM") || upper.contains("SHAPE")
    }

    /// Deterministic sequence name, or `None` for shape columns
    pub fn sequence_name(&self, table: &str, column: &str) -> Option<String> {
        if self.is_shape_column(column) {
            return None;
        }
        Some(format!("seq_{}_{}", table, column))
    }

    /// Name of the existing sequence backing `table.column`, if the sequence
    /// catalog lists one
    pub fn sequence_name_for(
        &self,
        cx: &mut dyn Connection,
        table: &str,
        column: &str,
    ) -> Result<Option<String>, DialectError> {
        let Some(name) = self.sequence_name(table, column) else {
            return Ok(None);
        };
        let sql = format!("SELECT seqname FROM syssequence WHERE seqname = {}", quote_literal(&name));
        debug!("{}", sql);

        let rs = cx.query(&sql)?;
        Ok(rs.first().and_then(|row| row.get_string(0)))
    }

    /// Draw the next value; `None` when the engine returns no row
    pub fn next_value(
        &self,
        cx: &mut dyn Connection,
        sequence: &str,
    ) -> Result<Option<i64>, DialectError> {
        let sql = format!("SELECT {}.NEXTVAL FROM DUAL", quote_identifier(sequence));
        debug!("{}", sql);

        let rs = cx.query(&sql)?;
        let value = rs.first().and_then(|row| row.get_i64(0));
        if value.is_none() {
            warn!("Failed to retrieve the next value from sequence {}", sequence);
        }
        Ok(value)
    }

    /// Last value generated in this session
    ///
    /// Only meaningful on the connection that ran the insert, before any
    /// other statement runs on it.
    pub fn last_generated_value(&self, cx: &mut dyn Connection) -> Result<Option<i64>, DialectError> {
        let sql = "SELECT lastval()";
        debug!("{}", sql);

        let rs = cx.query(sql)?;
        Ok(rs.first().and_then(|row| row.get_i64(0)))
    }

    pub fn create_sequence_sql(&self, sequence: &str) -> String {
        format!(
            "CREATE SEQUENCE {} START WITH 1 INCREMENT BY 1 MINVALUE 1 NOMAXVALUE",
            quote_identifier(sequence)
        )
    }

    pub fn drop_sequence_sql(&self, sequence: &str) -> String {
        format!("DROP SEQUENCE {}", quote_identifier(sequence))
    }
}
