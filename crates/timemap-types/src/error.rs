use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid timestamp string: {0}")]
    InvalidTimestamp(String),

    #[error("timestamp out of range: {0}ms")]
    OutOfRange(u64),
}
