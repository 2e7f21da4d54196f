//! Geometry values on the wire
//!
//! Geometries are read as WKB (`ST_ASBINARY`) and written as
//! `ST_GeomFromText('<wkt>', <srid>)` literals. The engine rejects WKT
//! strings longer than `MAX_WKT_LITERAL_LEN`; literals are not chunked, so an
//! oversized geometry fails when the statement runs.

use geokairos_geometry::{
    to_wkt, Envelope, Geometry, GeometryFactory, GeometryWithSrid, WkbReader,
};
use geokairos_types::{Row, SqlValue};
use log::debug;

use crate::sql::{encode_column_name, quote_literal};
use crate::DialectError;

/// Longest WKT text the engine accepts inside `ST_GeomFromText`
pub const MAX_WKT_LITERAL_LEN: usize = 4096;

/// Per-worker geometry encoder/decoder
///
/// Owns a reusable WKB reader, which is not safe to share: give each
/// concurrent worker its own codec.
#[derive(Debug, Clone, Default)]
pub struct GeometryCodec {
    reader: WkbReader,
}

impl GeometryCodec {
    pub fn new() -> Self {
        GeometryCodec { reader: WkbReader::default() }
    }

    /// Factory the reader is currently bound to
    pub fn factory(&self) -> &GeometryFactory {
        self.reader.factory()
    }

    /// Decode the WKB value at `column`; NULL decodes to `None`
    pub fn decode(
        &mut self,
        row: &Row,
        column: usize,
        factory: &GeometryFactory,
    ) -> Result<Option<GeometryWithSrid>, DialectError> {
        if self.reader.factory() != factory {
            self.reader.set_factory(*factory);
        }

        match row.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Binary(bytes)) => self
                .reader
                .read(bytes)
                .map(Some)
                .map_err(|e| DialectError::decode(format!("WKB geometry in column {}", column), e)),
            Some(other) => Err(DialectError::decode(
                format!("geometry in column {}", column),
                geokairos_geometry::GeometryError::Unsupported(format!(
                    "expected binary value, got {}",
                    other.type_name()
                )),
            )),
        }
    }

    /// Select-list fragment reading a geometry column as WKB
    pub fn encode_column_reference(&self, column: &str, prefix: Option<&str>) -> String {
        format!("ST_ASBINARY({})", encode_column_name(prefix, column))
    }

    /// Select-list fragment reading a geometry column's envelope as WKB
    pub fn encode_envelope_reference(&self, column: &str) -> String {
        format!("ST_ASBINARY(ST_ENVELOPE({}))", encode_column_name(None, column))
    }

    /// `ST_GeomFromText('<wkt>', <srid>)`, or `NULL`
    ///
    /// Rings, including those inside collections, are written as line strings
    /// since the engine's WKT has no ring construct. `_dimension` is accepted
    /// for parity with the column's registration; coordinates are always
    /// written in 2D.
    pub fn encode_literal(&self, geometry: Option<&Geometry>, _dimension: i32, srid: i32) -> String {
        let Some(geometry) = geometry else {
            return "NULL".to_string();
        };
        let wkt = match geometry {
            Geometry::LinearRing { .. } | Geometry::GeometryCollection { .. } => {
                to_wkt(&geometry.clone().into_open_line())
            }
            _ => to_wkt(geometry),
        };
        if wkt.len() > MAX_WKT_LITERAL_LEN {
            debug!(
                "WKT literal of {} bytes exceeds the engine limit of {}",
                wkt.len(),
                MAX_WKT_LITERAL_LEN
            );
        }
        format!("ST_GeomFromText({}, {})", quote_literal(&wkt), srid)
    }

    /// Envelope stored at `column`; NULL yields the empty envelope
    ///
    /// Text values are parsed as WKT, binary values as WKB.
    pub fn decode_envelope(&mut self, row: &Row, column: usize) -> Result<Envelope, DialectError> {
        match row.get(column) {
            None | Some(SqlValue::Null) => Ok(Envelope::empty()),
            Some(SqlValue::Varchar(text)) => Envelope::from_wkt(text)
                .map_err(|e| DialectError::decode("the bounds WKT", e)),
            Some(SqlValue::Binary(bytes)) => self.envelope_from_wkb(bytes),
            Some(other) => Err(DialectError::decode(
                "the bounds",
                geokairos_geometry::GeometryError::Unsupported(format!(
                    "unexpected {} value",
                    other.type_name()
                )),
            )),
        }
    }

    /// Envelope of a WKB geometry
    pub fn envelope_from_wkb(&mut self, bytes: &[u8]) -> Result<Envelope, DialectError> {
        self.reader
            .read(bytes)
            .map(|g| g.geometry.envelope())
            .map_err(|e| DialectError::decode("the bounds WKB", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geokairos_geometry::{geometry_to_wkb, PrecisionModel};

    #[test]
    fn test_column_fragments() {
        let codec = GeometryCodec::new();
        assert_eq!(codec.encode_column_reference("geom", None), "ST_ASBINARY(\"geom\")");
        assert_eq!(codec.encode_column_reference("geom", Some("r")), "ST_ASBINARY(\"r\".\"geom\")");
        assert_eq!(codec.encode_envelope_reference("geom"), "ST_ASBINARY(ST_ENVELOPE(\"geom\"))");
    }

    #[test]
    fn test_literal_forms() {
        let codec = GeometryCodec::new();
        assert_eq!(codec.encode_literal(None, 2, 4326), "NULL");
        assert_eq!(
            codec.encode_literal(Some(&Geometry::Point { x: 1.0, y: 2.0 }), 2, 4326),
            "ST_GeomFromText('POINT(1 2)', 4326)"
        );
    }

    #[test]
    fn test_ring_literal_is_written_as_line() {
        let codec = GeometryCodec::new();
        let ring = Geometry::LinearRing { points: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)] };
        assert_eq!(
            codec.encode_literal(Some(&ring), 2, -1),
            "ST_GeomFromText('LINESTRING(0 0, 1 0, 1 1, 0 0)', -1)"
        );
    }

    #[test]
    fn test_oversized_literal_is_not_rejected() {
        let codec = GeometryCodec::new();
        let points = (0..600).map(|i| (i as f64 + 0.123456, -(i as f64) - 0.654321)).collect();
        let literal = codec.encode_literal(Some(&Geometry::LineString { points }), 2, 0);
        assert!(literal.len() > MAX_WKT_LITERAL_LEN);
        assert!(literal.starts_with("ST_GeomFromText('LINESTRING("));
    }

    #[test]
    fn test_decode_null_and_wrong_type() {
        let mut codec = GeometryCodec::new();
        let row = Row::new(vec![SqlValue::Null, SqlValue::Integer(3)]);
        assert_eq!(codec.decode(&row, 0, &GeometryFactory::default()).unwrap(), None);
        assert!(matches!(
            codec.decode(&row, 1, &GeometryFactory::default()),
            Err(DialectError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_rebinds_factory_without_replacing_reader() {
        let mut codec = GeometryCodec::new();
        let row = Row::new(vec![SqlValue::Binary(geometry_to_wkb(&Geometry::Point { x: 1.26, y: 2.0 }))]);

        let first = codec.decode(&row, 0, &GeometryFactory::with_srid(4326)).unwrap().unwrap();
        assert_eq!(first.srid, 4326);
        assert_eq!(codec.factory(), &GeometryFactory::with_srid(4326));

        let fixed = GeometryFactory::new(3857, PrecisionModel::Fixed { scale: 10.0 });
        let second = codec.decode(&row, 0, &fixed).unwrap().unwrap();
        assert_eq!(second.srid, 3857);
        assert_eq!(second.geometry, Geometry::Point { x: 1.3, y: 2.0 });
        assert_eq!(codec.factory(), &fixed);
    }

    #[test]
    fn test_decode_envelope() {
        let mut codec = GeometryCodec::new();
        let row = Row::new(vec![
            SqlValue::Null,
            SqlValue::Varchar("POLYGON((0 0, 2 0, 2 3, 0 3, 0 0))".to_string()),
            SqlValue::Varchar("not wkt".to_string()),
        ]);
        assert!(codec.decode_envelope(&row, 0).unwrap().is_empty());
        assert_eq!(codec.decode_envelope(&row, 1).unwrap(), Envelope::new(0.0, 2.0, 0.0, 3.0));

        let err = codec.decode_envelope(&row, 2).unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
    }
}
