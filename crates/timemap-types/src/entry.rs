use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// One immutable `(timestamp, value)` pair in a key's history.
///
/// The value is opaque: it is stored and handed back without interpretation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<V, T = Timestamp> {
    timestamp: T,
    value: V,
}

impl<V, T> Entry<V, T> {
    pub fn new(timestamp: T, value: V) -> Self {
        Self { timestamp, value }
    }

    /// When this value became current.
    pub fn timestamp(&self) -> &T {
        &self.timestamp
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Split the entry back into its timestamp and value.
    pub fn into_parts(self) -> (T, V) {
        (self.timestamp, self.value)
    }
}
