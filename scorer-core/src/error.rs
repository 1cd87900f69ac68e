//! Common error types for the scoring engine

use thiserror::Error;

/// Common result type for scoring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes surfaced at each operation boundary
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest present but unreadable or unparsable
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Operation requires a scorer identity and none was supplied
    #[error("No scorer identity supplied")]
    MissingIdentity,

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Export requested before any scorer has recorded anything
    #[error("No scorer data recorded yet")]
    NoData,
}
