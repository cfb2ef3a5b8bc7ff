//! A single lock-protected key → history table.
//!
//! Both stores are built from [`Shard`]s: [`TimeSeriesMap`](crate::TimeSeriesMap)
//! owns exactly one, [`ShardedTimeSeriesMap`](crate::ShardedTimeSeriesMap)
//! owns several and routes each key to a fixed one. All checks made while a
//! guard is held go straight to the map and never re-lock.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use timemap_types::{Entry, History};
use tracing::{debug, warn};

use crate::config::{OrderingPolicy, TimeMapConfig};
use crate::error::{Result, TimeMapError};

type Table<V, T> = HashMap<String, History<V, T>>;

pub(crate) struct Shard<V, T> {
    histories: RwLock<Table<V, T>>,
}

fn poisoned<E: Display>(e: E) -> TimeMapError {
    warn!(error = %e, "time series lock poisoned");
    TimeMapError::LockPoisoned(e.to_string())
}

impl<V, T> Shard<V, T> {
    pub(crate) fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table<V, T>>> {
        self.histories.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table<V, T>>> {
        self.histories.write().map_err(poisoned)
    }

    pub(crate) fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(key))
    }

    pub(crate) fn remove(&self, key: &str) -> Result<bool> {
        let mut map = self.write()?;
        match map.remove(key) {
            Some(history) => {
                debug!(key, entries = history.len(), "removed history");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    pub(crate) fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Drop every history, returning how many keys were removed.
    pub(crate) fn clear(&self) -> Result<usize> {
        let mut map = self.write()?;
        let dropped = map.len();
        map.clear();
        Ok(dropped)
    }

    pub(crate) fn history_len(&self, key: &str) -> Result<usize> {
        Ok(self.read()?.get(key).map_or(0, History::len))
    }
}

impl<V: Clone, T: Ord + Clone + Debug> Shard<V, T> {
    pub(crate) fn set(
        &self,
        key: &str,
        value: V,
        timestamp: T,
        config: &TimeMapConfig,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(TimeMapError::EmptyKey);
        }

        let mut map = self.write()?;
        let history = map.entry(key.to_string()).or_insert_with(|| {
            debug!(key, "creating history");
            History::with_capacity(config.history_capacity)
        });

        if !history.is_out_of_order(&timestamp) {
            history.push(timestamp, value);
            return Ok(());
        }

        let last = history
            .last()
            .map(|e| format!("{:?}", e.timestamp()))
            .unwrap_or_default();
        match config.ordering {
            OrderingPolicy::Append => {
                warn!(key, %last, attempted = ?timestamp, "appending out-of-order timestamp");
                history.push(timestamp, value);
            }
            OrderingPolicy::Reject => {
                return Err(TimeMapError::OutOfOrder {
                    key: key.to_string(),
                    last,
                    attempted: format!("{timestamp:?}"),
                });
            }
            OrderingPolicy::SortedInsert => history.insert_sorted(timestamp, value),
        }
        Ok(())
    }

    pub(crate) fn get(&self, key: &str, at: &T) -> Result<Option<V>> {
        let map = self.read()?;
        Ok(map
            .get(key)
            .and_then(|h| h.lookup(at))
            .map(|e| e.value().clone()))
    }

    pub(crate) fn latest(&self, key: &str) -> Result<Option<V>> {
        let map = self.read()?;
        Ok(map
            .get(key)
            .and_then(History::last)
            .map(|e| e.value().clone()))
    }

    pub(crate) fn history(&self, key: &str) -> Result<Option<History<V, T>>> {
        Ok(self.read()?.get(key).cloned())
    }

    pub(crate) fn range(&self, key: &str, from: &T, to: &T) -> Result<Vec<Entry<V, T>>> {
        let map = self.read()?;
        Ok(map
            .get(key)
            .map(|h| h.range(from..=to).to_vec())
            .unwrap_or_default())
    }
}

#[cfg(test)]
impl<V: Send + Sync, T: Send + Sync> Shard<V, T> {
    /// Poison the lock by panicking while holding the write guard.
    pub(crate) fn poison(&self) {
        let result = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = self.histories.write();
                panic!("poison the lock");
            })
            .join()
        });
        assert!(result.is_err());
    }
}
