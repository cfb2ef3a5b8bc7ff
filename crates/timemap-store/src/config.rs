use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeMapError};

/// What `set` does when a timestamp is earlier than the key's last entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Append anyway in O(1). Lookups on that key may return wrong answers
    /// until it is removed; callers are expected to write non-decreasing
    /// timestamps per key.
    #[default]
    Append,
    /// Refuse the write and leave the history unchanged.
    Reject,
    /// Insert at the sorted position, after entries with an equal timestamp.
    SortedInsert,
}

/// Configuration for a time-series store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeMapConfig {
    /// Handling of out-of-order writes.
    pub ordering: OrderingPolicy,
    /// Number of independently locked shards. Only the sharded store reads
    /// this; it must be at least 1.
    pub shards: usize,
    /// Initial capacity reserved for each newly created history.
    pub history_capacity: usize,
}

impl Default for TimeMapConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingPolicy::Append,
            shards: 16,
            history_capacity: 0,
        }
    }
}

impl TimeMapConfig {
    /// A configuration that refuses out-of-order writes.
    pub fn strict() -> Self {
        Self {
            ordering: OrderingPolicy::Reject,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| TimeMapError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.shards == 0 {
            return Err(TimeMapError::InvalidConfig(
                "shards must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
