//! Statistics-based bounds
//!
//! An optimization only: any failure is logged and reported as unavailable,
//! and the caller falls back to aggregating envelopes itself.

use geokairos_geometry::{CoordinateReferenceSystem, Envelope, ReferencedEnvelope};
use geokairos_types::{Connection, Savepoint};
use log::{debug, warn};

use crate::sql::quote_identifier;
use crate::{DialectError, GeometryCodec};

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsEstimator;

impl BoundsEstimator {
    pub fn new() -> Self {
        BoundsEstimator
    }

    /// Extent of `table.geometry_column` from the engine's statistics
    ///
    /// Inside a manual-commit transaction the query runs under a savepoint
    /// that is rolled back on failure and released either way. An empty
    /// table yields an empty envelope.
    pub fn estimate(
        &self,
        cx: &mut dyn Connection,
        codec: &mut GeometryCodec,
        table: &str,
        geometry_column: &str,
        crs: Option<&CoordinateReferenceSystem>,
    ) -> Option<ReferencedEnvelope> {
        let savepoint = if cx.auto_commit() {
            None
        } else {
            match cx.set_savepoint() {
                Ok(savepoint) => Some(savepoint),
                Err(e) => {
                    warn!("Failed to set a savepoint for estimated extents: {}", e);
                    return None;
                }
            }
        };

        let result = self.query_extent(cx, codec, table, geometry_column);
        if result.is_err() {
            if let Some(savepoint) = &savepoint {
                if let Err(e) = cx.rollback_to_savepoint(savepoint) {
                    warn!("Failed to roll back to savepoint {}: {}", savepoint.name, e);
                }
            }
        }
        if let Some(savepoint) = savepoint {
            release(cx, savepoint);
        }

        match result {
            Ok(envelope) => Some(ReferencedEnvelope::new(envelope, crs.cloned())),
            Err(e) => {
                warn!("Failed to use ST_EXTENT on {}, falling back on envelope aggregation: {}", table, e);
                None
            }
        }
    }

    fn query_extent(
        &self,
        cx: &mut dyn Connection,
        codec: &mut GeometryCodec,
        table: &str,
        geometry_column: &str,
    ) -> Result<Envelope, DialectError> {
        let sql = format!(
            "SELECT ST_ASBINARY(ST_EXTENT({})) FROM {}",
            quote_identifier(geometry_column),
            quote_identifier(table)
        );
        debug!("{}", sql);

        let rs = cx.query(&sql)?;
        match rs.first().and_then(|row| row.get_bytes(0)) {
            Some(bytes) => codec.envelope_from_wkb(bytes),
            None => Ok(Envelope::empty()),
        }
    }
}

fn release(cx: &mut dyn Connection, savepoint: Savepoint) {
    let name = savepoint.name.clone();
    if let Err(e) = cx.release_savepoint(savepoint) {
        warn!("Failed to release savepoint {}: {}", name, e);
    }
}
