//! Single-lock time-series map.
//!
//! [`TimeSeriesMap`] stores all histories in one `HashMap` protected by one
//! `RwLock`. Writes serialize against everything; reads share the lock with
//! each other. See [`ShardedTimeSeriesMap`](crate::ShardedTimeSeriesMap) when
//! unrelated keys contend.

use std::fmt::Debug;

use timemap_types::{Entry, History, Timestamp};

use crate::config::TimeMapConfig;
use crate::error::Result;
use crate::shard::Shard;
use crate::traits::TimeSeriesStore;

/// A thread-safe map from key to timestamped history.
///
/// All data lives in memory and is lost when the map is dropped.
pub struct TimeSeriesMap<V, T = Timestamp> {
    config: TimeMapConfig,
    shard: Shard<V, T>,
}

impl<V, T> TimeSeriesMap<V, T> {
    /// Create a new empty map with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TimeMapConfig::default())
    }

    /// Create a new empty map. `config.shards` is ignored.
    pub fn with_config(config: TimeMapConfig) -> Self {
        Self {
            config,
            shard: Shard::new(),
        }
    }

    pub fn config(&self) -> &TimeMapConfig {
        &self.config
    }
}

impl<V, T> Default for TimeSeriesMap<V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, T> TimeSeriesStore<V, T> for TimeSeriesMap<V, T>
where
    V: Clone + Send + Sync,
    T: Ord + Clone + Debug + Send + Sync,
{
    fn try_set(&self, key: &str, value: V, timestamp: T) -> Result<()> {
        self.shard.set(key, value, timestamp, &self.config)
    }

    fn try_get(&self, key: &str, at: &T) -> Result<Option<V>> {
        self.shard.get(key, at)
    }

    fn try_latest(&self, key: &str) -> Result<Option<V>> {
        self.shard.latest(key)
    }

    fn try_history(&self, key: &str) -> Result<Option<History<V, T>>> {
        self.shard.history(key)
    }

    fn try_range(&self, key: &str, from: &T, to: &T) -> Result<Vec<Entry<V, T>>> {
        self.shard.range(key, from, to)
    }

    fn try_history_len(&self, key: &str) -> Result<usize> {
        self.shard.history_len(key)
    }

    fn try_contains(&self, key: &str) -> Result<bool> {
        self.shard.contains(key)
    }

    fn try_remove(&self, key: &str) -> Result<bool> {
        self.shard.remove(key)
    }

    fn try_keys(&self) -> Result<Vec<String>> {
        self.shard.keys()
    }

    fn try_len(&self) -> Result<usize> {
        self.shard.len()
    }

    fn try_clear(&self) -> Result<()> {
        self.shard.clear().map(|_| ())
    }
}

impl<V, T> std::fmt::Debug for TimeSeriesMap<V, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSeriesMap")
            .field("key_count", &self.shard.len().ok())
            .field("ordering", &self.config.ordering)
            .finish()
    }
}
