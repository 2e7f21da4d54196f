use crate::{parse_wkt, CoordinateReferenceSystem, Geometry, GeometryError};

/// Axis-aligned bounding box
///
/// The null envelope (`Envelope::empty()`) has `min > max` on both axes and
/// absorbs nothing; expanding it by a point makes it that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Envelope {
    /// Envelope spanning the two corners, normalized so min <= max
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Envelope { min_x: x1.min(x2), max_x: x1.max(x2), min_y: y1.min(y2), max_y: y1.max(y2) }
    }

    pub fn empty() -> Self {
        Envelope { min_x: 0.0, max_x: -1.0, min_y: 0.0, max_y: -1.0 }
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x
    }

    pub fn of(geometry: &Geometry) -> Self {
        geometry.envelope()
    }

    /// Envelope of a WKT geometry
    pub fn from_wkt(text: &str) -> Result<Self, GeometryError> {
        Ok(parse_wkt(text)?.envelope())
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    pub fn expand_to_include(&mut self, other: &Envelope) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.is_empty() && x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope::empty()
    }
}

/// An envelope tagged with the coordinate reference system it is expressed in
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencedEnvelope {
    pub envelope: Envelope,
    pub crs: Option<CoordinateReferenceSystem>,
}

impl ReferencedEnvelope {
    pub fn new(envelope: Envelope, crs: Option<CoordinateReferenceSystem>) -> Self {
        ReferencedEnvelope { envelope, crs }
    }
}
