//! WKB (Well-Known Binary) reader and writer
//!
//! The reader accepts both byte orders, the EWKB SRID/Z/M flags and the ISO
//! 1000/2000/3000 type offsets. Z and M ordinates are read and discarded.
//! The writer always emits little-endian 2D WKB.

use crate::{Geometry, GeometryError, GeometryFactory, GeometryKind, GeometryWithSrid};

// EWKB flags (PostGIS extension)
const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const EWKB_FLAGS: u32 = EWKB_Z_FLAG | EWKB_M_FLAG | EWKB_SRID_FLAG;

/// Deepest collection/multi nesting the reader follows
pub const MAX_NESTING_DEPTH: usize = 64;

/// Byte order marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    LittleEndian = 1,
    BigEndian = 0,
}

impl ByteOrder {
    fn from_u8(val: u8) -> Result<Self, GeometryError> {
        match val {
            0 => Ok(ByteOrder::BigEndian),
            1 => Ok(ByteOrder::LittleEndian),
            _ => Err(GeometryError::InvalidByteOrder(val)),
        }
    }
}

/// Reusable WKB parser bound to a geometry factory
///
/// Holds per-parse state (current byte order and ordinate count), so one
/// instance must not be shared between simultaneous callers. Rebinding the
/// factory with `set_factory` keeps the reader itself.
#[derive(Debug, Clone)]
pub struct WkbReader {
    factory: GeometryFactory,
    order: ByteOrder,
    ordinates: usize,
    pos: usize,
}

impl WkbReader {
    pub fn new(factory: GeometryFactory) -> Self {
        WkbReader { factory, order: ByteOrder::LittleEndian, ordinates: 2, pos: 0 }
    }

    pub fn factory(&self) -> &GeometryFactory {
        &self.factory
    }

    pub fn set_factory(&mut self, factory: GeometryFactory) {
        self.factory = factory;
    }

    /// Parse one geometry. The SRID is the one embedded in EWKB input, else
    /// the bound factory's.
    pub fn read(&mut self, data: &[u8]) -> Result<GeometryWithSrid, GeometryError> {
        self.pos = 0;
        let (geometry, srid) = self.parse_geometry(data, 0)?;
        Ok(GeometryWithSrid::new(geometry, srid.unwrap_or(self.factory.srid)))
    }

    fn parse_geometry(
        &mut self,
        data: &[u8],
        depth: usize,
    ) -> Result<(Geometry, Option<i32>), GeometryError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(GeometryError::TooDeep { limit: MAX_NESTING_DEPTH });
        }
        self.order = ByteOrder::from_u8(self.read_u8(data)?)?;
        let raw_type = self.read_u32(data)?;

        let mut has_z = raw_type & EWKB_Z_FLAG != 0;
        let mut has_m = raw_type & EWKB_M_FLAG != 0;
        let srid = if raw_type & EWKB_SRID_FLAG != 0 { Some(self.read_i32(data)?) } else { None };

        let iso_type = raw_type & !EWKB_FLAGS;
        match iso_type / 1000 {
            0 => {}
            1 => has_z = true,
            2 => has_m = true,
            3 => {
                has_z = true;
                has_m = true;
            }
            _ => return Err(GeometryError::UnknownType(raw_type)),
        }
        self.ordinates = 2 + has_z as usize + has_m as usize;

        let kind = GeometryKind::from_wkb_code(iso_type % 1000)
            .ok_or(GeometryError::UnknownType(raw_type))?;

        let geometry = match kind {
            GeometryKind::Point => {
                let (x, y) = self.read_coordinate(data)?;
                Geometry::Point { x, y }
            }
            GeometryKind::LineString => {
                let points = self.read_coordinates(data)?;
                if points.len() == 1 {
                    return Err(GeometryError::Invalid {
                        kind: "LINESTRING",
                        reason: "must have 0 or >= 2 points".to_string(),
                    });
                }
                Geometry::LineString { points }
            }
            GeometryKind::Polygon => Geometry::Polygon { rings: self.read_rings(data)? },
            GeometryKind::MultiPoint => {
                let mut points = Vec::new();
                for part in self.read_parts(data, GeometryKind::Point, depth)? {
                    if let Geometry::Point { x, y } = part {
                        points.push((x, y));
                    }
                }
                Geometry::MultiPoint { points }
            }
            GeometryKind::MultiLineString => {
                let mut lines = Vec::new();
                for part in self.read_parts(data, GeometryKind::LineString, depth)? {
                    if let Geometry::LineString { points } = part {
                        lines.push(points);
                    }
                }
                Geometry::MultiLineString { lines }
            }
            GeometryKind::MultiPolygon => {
                let mut polygons = Vec::new();
                for part in self.read_parts(data, GeometryKind::Polygon, depth)? {
                    if let Geometry::Polygon { rings } = part {
                        polygons.push(rings);
                    }
                }
                Geometry::MultiPolygon { polygons }
            }
            GeometryKind::GeometryCollection => {
                let count = self.read_u32(data)? as usize;
                let mut geometries = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    geometries.push(self.parse_geometry(data, depth + 1)?.0);
                }
                Geometry::GeometryCollection { geometries }
            }
            GeometryKind::Geometry => return Err(GeometryError::UnknownType(raw_type)),
        };

        Ok((geometry, srid))
    }

    /// Each member of a multi geometry carries its own full header
    fn read_parts(
        &mut self,
        data: &[u8],
        expected: GeometryKind,
        depth: usize,
    ) -> Result<Vec<Geometry>, GeometryError> {
        let count = self.read_u32(data)? as usize;
        let mut parts = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let (part, _) = self.parse_geometry(data, depth + 1)?;
            if part.kind() != expected {
                return Err(GeometryError::Invalid {
                    kind: expected.name(),
                    reason: format!("multi geometry member is {}", part.geometry_type()),
                });
            }
            parts.push(part);
        }
        Ok(parts)
    }

    fn read_rings(&mut self, data: &[u8]) -> Result<Vec<Vec<(f64, f64)>>, GeometryError> {
        let count = self.read_u32(data)? as usize;
        let mut rings = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            rings.push(self.read_coordinates(data)?);
        }
        Ok(rings)
    }

    fn read_coordinates(&mut self, data: &[u8]) -> Result<Vec<(f64, f64)>, GeometryError> {
        let count = self.read_u32(data)? as usize;
        let mut points = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            points.push(self.read_coordinate(data)?);
        }
        Ok(points)
    }

    fn read_coordinate(&mut self, data: &[u8]) -> Result<(f64, f64), GeometryError> {
        let x = self.read_f64(data)?;
        let y = self.read_f64(data)?;
        for _ in 2..self.ordinates {
            self.read_f64(data)?;
        }
        let precision = self.factory.precision;
        Ok((precision.make_precise(x), precision.make_precise(y)))
    }

    fn take<const N: usize>(&mut self, data: &[u8]) -> Result<[u8; N], GeometryError> {
        let end = self.pos + N;
        let bytes = data
            .get(self.pos..end)
            .ok_or(GeometryError::UnexpectedEof { offset: self.pos })?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        self.pos = end;
        Ok(buf)
    }

    fn read_u8(&mut self, data: &[u8]) -> Result<u8, GeometryError> {
        Ok(self.take::<1>(data)?[0])
    }

    fn read_u32(&mut self, data: &[u8]) -> Result<u32, GeometryError> {
        let buf = self.take::<4>(data)?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u32::from_le_bytes(buf),
            ByteOrder::BigEndian => u32::from_be_bytes(buf),
        })
    }

    fn read_i32(&mut self, data: &[u8]) -> Result<i32, GeometryError> {
        let buf = self.take::<4>(data)?;
        Ok(match self.order {
            ByteOrder::LittleEndian => i32::from_le_bytes(buf),
            ByteOrder::BigEndian => i32::from_be_bytes(buf),
        })
    }

    fn read_f64(&mut self, data: &[u8]) -> Result<f64, GeometryError> {
        let buf = self.take::<8>(data)?;
        Ok(match self.order {
            ByteOrder::LittleEndian => f64::from_le_bytes(buf),
            ByteOrder::BigEndian => f64::from_be_bytes(buf),
        })
    }
}

impl Default for WkbReader {
    fn default() -> Self {
        WkbReader::new(GeometryFactory::default())
    }
}

// WKB Serialization

/// Convert a geometry to WKB (Well-Known Binary) format
pub fn geometry_to_wkb(geom: &Geometry) -> Vec<u8> {
    let mut buf = Vec::new();
    serialize_geometry(geom, None, &mut buf);
    buf
}

/// Convert a geometry to EWKB (Extended WKB) format with SRID
pub fn geometry_to_ewkb(geom: &Geometry, srid: i32) -> Vec<u8> {
    let mut buf = Vec::new();
    serialize_geometry(geom, (srid > 0).then_some(srid), &mut buf);
    buf
}

fn serialize_geometry(geom: &Geometry, srid: Option<i32>, buf: &mut Vec<u8>) {
    buf.push(ByteOrder::LittleEndian as u8);
    let code = geom.kind().wkb_code();
    match srid {
        Some(srid) => {
            write_u32(buf, code | EWKB_SRID_FLAG);
            write_i32(buf, srid);
        }
        None => write_u32(buf, code),
    }

    match geom {
        Geometry::Point { x, y } => {
            write_f64(buf, *x);
            write_f64(buf, *y);
        }
        Geometry::LineString { points } | Geometry::LinearRing { points } => {
            write_points(buf, points);
        }
        Geometry::Polygon { rings } => write_rings(buf, rings),
        Geometry::MultiPoint { points } => {
            write_u32(buf, points.len() as u32);
            for (x, y) in points {
                serialize_geometry(&Geometry::Point { x: *x, y: *y }, None, buf);
            }
        }
        Geometry::MultiLineString { lines } => {
            write_u32(buf, lines.len() as u32);
            for line in lines {
                buf.push(ByteOrder::LittleEndian as u8);
                write_u32(buf, GeometryKind::LineString.wkb_code());
                write_points(buf, line);
            }
        }
        Geometry::MultiPolygon { polygons } => {
            write_u32(buf, polygons.len() as u32);
            for rings in polygons {
                buf.push(ByteOrder::LittleEndian as u8);
                write_u32(buf, GeometryKind::Polygon.wkb_code());
                write_rings(buf, rings);
            }
        }
        Geometry::GeometryCollection { geometries } => {
            write_u32(buf, geometries.len() as u32);
            for geom in geometries {
                serialize_geometry(geom, None, buf);
            }
        }
    }
}

fn write_points(buf: &mut Vec<u8>, points: &[(f64, f64)]) {
    write_u32(buf, points.len() as u32);
    for (x, y) in points {
        write_f64(buf, *x);
        write_f64(buf, *y);
    }
}

fn write_rings(buf: &mut Vec<u8>, rings: &[Vec<(f64, f64)>]) {
    write_u32(buf, rings.len() as u32);
    for ring in rings {
        write_points(buf, ring);
    }
}

fn write_u32(buf: &mut Vec<u8>, val: u32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

fn write_i32(buf: &mut Vec<u8>, val: i32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

fn write_f64(buf: &mut Vec<u8>, val: f64) {
    buf.extend_from_slice(&val.to_le_bytes());
}
