//! Kairos spatial dialect
//!
//! Translates between a generic feature-store framework and the Kairos
//! engine's SQL surface: type mapping, geometry encoding, spatial catalog
//! maintenance, key sequences and bounds estimation.

pub mod bounds;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod literal;
pub mod metadata;
pub mod sequence;
pub mod sql;
pub mod types;

pub use bounds::BoundsEstimator;
pub use catalog::{spatial_index_name, SpatialCatalogSynchronizer, TableLifecycle};
pub use codec::{GeometryCodec, MAX_WKT_LITERAL_LEN};
pub use config::DialectConfig;
pub use descriptor::{AttributeDescriptor, ColumnMetadata, FeatureTypeDescriptor};
pub use dialect::{FilterEncoderSettings, KairosDialect, SpatialDialect, MINIMUM_VERSION};
pub use error::DialectError;
pub use literal::{encode_binary, encode_value};
pub use metadata::MetadataResolver;
pub use sequence::SequenceKeyProvider;
pub use types::{SqlType, TypeMappingRegistry, ValueType, GEOMETRY_DISPATCH_BASE};
