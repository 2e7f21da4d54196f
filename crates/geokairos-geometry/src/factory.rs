/// How decoded coordinates are rounded
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PrecisionModel {
    /// Full double precision
    #[default]
    Floating,
    /// Coordinates snapped to a grid of `1 / scale`
    Fixed { scale: f64 },
}

impl PrecisionModel {
    pub fn make_precise(&self, value: f64) -> f64 {
        match self {
            PrecisionModel::Floating => value,
            PrecisionModel::Fixed { scale } if *scale > 0.0 && value.is_finite() => {
                (value * scale).round() / scale
            }
            PrecisionModel::Fixed { .. } => value,
        }
    }
}

/// Settings applied to every geometry a reader builds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryFactory {
    pub srid: i32,
    pub precision: PrecisionModel,
}

impl GeometryFactory {
    pub fn new(srid: i32, precision: PrecisionModel) -> Self {
        GeometryFactory { srid, precision }
    }

    pub fn with_srid(srid: i32) -> Self {
        GeometryFactory { srid, precision: PrecisionModel::Floating }
    }
}

impl Default for GeometryFactory {
    fn default() -> Self {
        GeometryFactory { srid: 0, precision: PrecisionModel::Floating }
    }
}
