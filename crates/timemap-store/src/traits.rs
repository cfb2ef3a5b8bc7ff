//! The [`TimeSeriesStore`] trait defining the point-in-time store interface.
//!
//! Any backend (single-lock, sharded) implements this trait to provide keyed
//! histories with "value as of time T" lookups.

use timemap_types::{Entry, History, Timestamp};

use crate::error::Result;

/// Storage backend for keyed, timestamped histories.
///
/// Implementations must be thread-safe (`Send + Sync`). Writes (`set`,
/// `remove`, `clear`) take exclusive access to the affected histories;
/// every other operation takes shared access.
///
/// Each operation comes in two forms. The `try_*` methods are the ones
/// implementations provide and report why an operation failed. The plain
/// methods are provided on top of them and collapse every failure into
/// `false`, `None`, or an empty result.
///
/// # Timestamp contract
///
/// Lookups binary-search each history, so writers must use non-decreasing
/// timestamps per key unless the store is configured with
/// [`OrderingPolicy::Reject`](crate::OrderingPolicy::Reject) or
/// [`OrderingPolicy::SortedInsert`](crate::OrderingPolicy::SortedInsert).
pub trait TimeSeriesStore<V, T = Timestamp>: Send + Sync {
    /// Append `value` at `timestamp` to the history for `key`, creating the
    /// history if this is the key's first write.
    ///
    /// Fails with `EmptyKey` for `""`, leaving the store untouched.
    fn try_set(&self, key: &str, value: V, timestamp: T) -> Result<()>;

    /// The value of `key` as of `at`: the latest entry whose timestamp is not
    /// after `at`.
    ///
    /// Returns `Ok(None)` if the key is absent or every entry is after `at`.
    fn try_get(&self, key: &str, at: &T) -> Result<Option<V>>;

    /// The value of the key's most recent entry.
    fn try_latest(&self, key: &str) -> Result<Option<V>>;

    /// A snapshot of the key's full history.
    fn try_history(&self, key: &str) -> Result<Option<History<V, T>>>;

    /// Entries with `from <= timestamp <= to`, oldest first.
    fn try_range(&self, key: &str, from: &T, to: &T) -> Result<Vec<Entry<V, T>>>;

    /// Number of entries recorded for `key`; zero if absent.
    fn try_history_len(&self, key: &str) -> Result<usize>;

    /// Whether `key` has a history, regardless of its length.
    fn try_contains(&self, key: &str) -> Result<bool>;

    /// Delete `key` and its entire history.
    ///
    /// Returns `Ok(true)` if the key existed and was deleted, `Ok(false)` if
    /// it did not exist.
    fn try_remove(&self, key: &str) -> Result<bool>;

    /// Every key currently present, each exactly once, in no particular order.
    fn try_keys(&self) -> Result<Vec<String>>;

    /// Number of keys currently present.
    fn try_len(&self) -> Result<usize>;

    /// Drop every history.
    fn try_clear(&self) -> Result<()>;

    /// Returns `true` if the value was recorded.
    fn set(&self, key: &str, value: V, timestamp: T) -> bool {
        self.try_set(key, value, timestamp).is_ok()
    }

    fn get(&self, key: &str, at: &T) -> Option<V> {
        self.try_get(key, at).ok().flatten()
    }

    fn latest(&self, key: &str) -> Option<V> {
        self.try_latest(key).ok().flatten()
    }

    fn history(&self, key: &str) -> Option<History<V, T>> {
        self.try_history(key).ok().flatten()
    }

    fn range(&self, key: &str, from: &T, to: &T) -> Vec<Entry<V, T>> {
        self.try_range(key, from, to).unwrap_or_default()
    }

    fn history_len(&self, key: &str) -> usize {
        self.try_history_len(key).unwrap_or_default()
    }

    fn contains(&self, key: &str) -> bool {
        self.try_contains(key).unwrap_or(false)
    }

    /// Returns `true` if the key existed and was deleted.
    fn remove(&self, key: &str) -> bool {
        self.try_remove(key).unwrap_or(false)
    }

    fn keys(&self) -> Vec<String> {
        self.try_keys().unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.try_len().unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if every history was dropped.
    fn clear(&self) -> bool {
        self.try_clear().is_ok()
    }
}
