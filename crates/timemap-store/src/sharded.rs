//! Lock-striped time-series map.
//!
//! [`ShardedTimeSeriesMap`] spreads keys over `config.shards` independent
//! tables, each behind its own `RwLock`. A key always hashes to the same
//! shard, so per-key ordering is exactly as strong as in
//! [`TimeSeriesMap`](crate::TimeSeriesMap); writes to keys on different
//! shards no longer contend.
//!
//! Whole-map operations (`keys`, `len`, `clear`) visit the shards one at a
//! time and are not atomic with respect to concurrent writers.

use std::collections::hash_map::RandomState;
use std::fmt::Debug;
use std::hash::BuildHasher;

use timemap_types::{Entry, History, Timestamp};
use tracing::debug;

use crate::config::TimeMapConfig;
use crate::error::Result;
use crate::shard::Shard;
use crate::traits::TimeSeriesStore;

/// A thread-safe map from key to timestamped history, striped over several
/// locks.
pub struct ShardedTimeSeriesMap<V, T = Timestamp> {
    config: TimeMapConfig,
    hasher: RandomState,
    shards: Vec<Shard<V, T>>,
}

impl<V, T> ShardedTimeSeriesMap<V, T> {
    /// Create a new empty map with the default configuration.
    pub fn new() -> Self {
        Self::build(TimeMapConfig::default())
    }

    /// Create a new empty map. Fails if `config` does not validate.
    pub fn with_config(config: TimeMapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: TimeMapConfig) -> Self {
        let shards = (0..config.shards).map(|_| Shard::new()).collect();
        debug!(shards = config.shards, "created sharded time series map");
        Self {
            config,
            hasher: RandomState::new(),
            shards,
        }
    }

    pub fn config(&self) -> &TimeMapConfig {
        &self.config
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, key: &str) -> usize {
        (self.hasher.hash_one(key) % self.shards.len() as u64) as usize
    }

    fn shard(&self, key: &str) -> &Shard<V, T> {
        &self.shards[self.shard_index(key)]
    }
}

impl<V, T> Default for ShardedTimeSeriesMap<V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, T> TimeSeriesStore<V, T> for ShardedTimeSeriesMap<V, T>
where
    V: Clone + Send + Sync,
    T: Ord + Clone + Debug + Send + Sync,
{
    fn try_set(&self, key: &str, value: V, timestamp: T) -> Result<()> {
        self.shard(key).set(key, value, timestamp, &self.config)
    }

    fn try_get(&self, key: &str, at: &T) -> Result<Option<V>> {
        self.shard(key).get(key, at)
    }

    fn try_latest(&self, key: &str) -> Result<Option<V>> {
        self.shard(key).latest(key)
    }

    fn try_history(&self, key: &str) -> Result<Option<History<V, T>>> {
        self.shard(key).history(key)
    }

    fn try_range(&self, key: &str, from: &T, to: &T) -> Result<Vec<Entry<V, T>>> {
        self.shard(key).range(key, from, to)
    }

    fn try_history_len(&self, key: &str) -> Result<usize> {
        self.shard(key).history_len(key)
    }

    fn try_contains(&self, key: &str) -> Result<bool> {
        self.shard(key).contains(key)
    }

    fn try_remove(&self, key: &str) -> Result<bool> {
        self.shard(key).remove(key)
    }

    fn try_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for shard in &self.shards {
            keys.extend(shard.keys()?);
        }
        Ok(keys)
    }

    fn try_len(&self) -> Result<usize> {
        self.shards.iter().map(Shard::len).sum()
    }

    fn try_clear(&self) -> Result<()> {
        let mut dropped = 0;
        for shard in &self.shards {
            dropped += shard.clear()?;
        }
        debug!(dropped, "cleared sharded time series map");
        Ok(())
    }
}

impl<V, T> std::fmt::Debug for ShardedTimeSeriesMap<V, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key_count: Option<usize> = self.shards.iter().map(|s| s.len().ok()).sum();
        f.debug_struct("ShardedTimeSeriesMap")
            .field("shards", &self.shards.len())
            .field("key_count", &key_count)
            .field("ordering", &self.config.ordering)
            .finish()
    }
}
