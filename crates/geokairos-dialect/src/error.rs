use geokairos_geometry::GeometryError;
use geokairos_types::ConnectionError;
use thiserror::Error;

/// Errors surfaced by the dialect to the host framework
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialectError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A stored geometry or envelope could not be parsed
    #[error("Error decoding {context}")]
    Decode {
        context: String,
        #[source]
        source: GeometryError,
    },

    /// Spatial catalog synchronization failed; the unit was not committed
    #[error("Spatial catalog synchronization failed for table '{table}'")]
    Catalog {
        table: String,
        #[source]
        source: ConnectionError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DialectError {
    pub(crate) fn decode(context: impl Into<String>, source: GeometryError) -> Self {
        DialectError::Decode { context: context.into(), source }
    }

    pub(crate) fn catalog(table: &str, source: ConnectionError) -> Self {
        DialectError::Catalog { table: table.to_string(), source }
    }
}
