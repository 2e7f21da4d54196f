//! Shared value and connection types
//!
//! This crate holds what every other geokairos crate agrees on:
//! - SQL values as read from and written to the engine
//! - Rows and result sets returned by queries
//! - The borrowed `Connection` seam the dialect issues statements through

mod connection;
mod error;
mod row;
mod sql_value;

pub use connection::{Connection, Savepoint};
pub use error::ConnectionError;
pub use row::{ResultSet, Row};
pub use sql_value::SqlValue;
