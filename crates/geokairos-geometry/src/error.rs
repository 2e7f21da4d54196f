use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Unexpected end of WKB data at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Invalid WKB byte order: {0}")]
    InvalidByteOrder(u8),

    #[error("Unknown WKB geometry type: {0}")]
    UnknownType(u32),

    #[error("WKB geometry nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("Invalid {kind} geometry: {reason}")]
    Invalid { kind: &'static str, reason: String },

    #[error("Invalid WKT: {0}")]
    WktParse(String),

    #[error("Unsupported geometry: {0}")]
    Unsupported(String),
}
