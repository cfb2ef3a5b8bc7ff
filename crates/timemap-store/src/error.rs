//! Error types for time-series store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// The boolean and `Option` forms on [`TimeSeriesStore`](crate::TimeSeriesStore)
/// collapse these into failure; the `try_*` forms report which one it was.
#[derive(Debug, Error)]
pub enum TimeMapError {
    /// The empty string is never a valid key.
    #[error("key must not be empty")]
    EmptyKey,

    /// A write carried a timestamp earlier than the key's last entry and the
    /// store is configured to reject such writes.
    #[error("out-of-order timestamp for key {key}: {attempted} is before {last}")]
    OutOfOrder {
        key: String,
        last: String,
        attempted: String,
    },

    /// Another thread panicked while holding the store's lock.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Configuration failed to parse or validate.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, TimeMapError>;
