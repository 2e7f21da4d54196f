use crate::{ConnectionError, ResultSet};

/// A savepoint handed out by `Connection::set_savepoint`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savepoint {
    pub id: u64,
    pub name: String,
}

/// A borrowed session on the target engine
///
/// The dialect never owns or pools connections: the host framework lends one
/// for each call. Manual-commit mode (`auto_commit() == false`) means a
/// transaction is implicitly open and ends only on `commit` or `rollback`.
pub trait Connection {
    /// Run a statement that returns rows
    fn query(&mut self, sql: &str) -> Result<ResultSet, ConnectionError>;

    /// Run a statement that returns no rows; yields the affected row count
    fn execute(&mut self, sql: &str) -> Result<u64, ConnectionError>;

    fn auto_commit(&self) -> bool;

    fn set_auto_commit(&mut self, auto_commit: bool) -> Result<(), ConnectionError>;

    fn commit(&mut self) -> Result<(), ConnectionError>;

    fn rollback(&mut self) -> Result<(), ConnectionError>;

    /// Create an unnamed savepoint inside the open transaction
    fn set_savepoint(&mut self) -> Result<Savepoint, ConnectionError>;

    fn rollback_to_savepoint(&mut self, savepoint: &Savepoint) -> Result<(), ConnectionError>;

    fn release_savepoint(&mut self, savepoint: Savepoint) -> Result<(), ConnectionError>;

    /// Engine version as (major, minor)
    fn server_version(&self) -> Result<(u32, u32), ConnectionError>;
}
