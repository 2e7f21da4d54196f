//! In-memory stand-in for the Kairos engine
//!
//! `MemoryEngine` implements `Connection` and understands exactly the SQL the
//! geokairos dialect emits: spatial catalog reads and writes, R-tree index
//! creation, sequences, `ST_EXTENT` statistics and declared-type lookups. It
//! keeps a log of everything it was asked to do and can be told to fail
//! statements matching a pattern.

mod engine;
mod spatial_index;
mod state;
mod statement;
mod transactions;

pub use engine::{EngineEvent, MemoryEngine};
pub use spatial_index::{SpatialIndex, SpatialIndexEntry};
pub use state::{CatalogRow, DeclaredColumn, EngineState};
pub use statement::{Literal, Predicate, Statement};
pub use transactions::TransactionManager;
