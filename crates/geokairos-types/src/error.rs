use thiserror::Error;

/// Errors raised by a `Connection` implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectionError {
    /// The engine rejected or failed to run a statement
    #[error("SQL error: {0}")]
    Sql(String),

    /// Commit, rollback or savepoint handling failed
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The statement is not understood by this connection
    #[error("Unsupported statement: {0}")]
    Unsupported(String),
}
