//! Per-key ordered history and the point-in-time lookup.
//!
//! A [`History`] is an append-only sequence of [`Entry`] values. Lookups
//! binary-search it, so they are only correct while the sequence is sorted
//! by timestamp ascending. [`History::push`] does not check this;
//! [`History::insert_sorted`] keeps it by construction.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::timestamp::Timestamp;

/// An ordered sequence of entries belonging to one key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct History<V, T = Timestamp> {
    entries: Vec<Entry<V, T>>,
}

impl<V, T> History<V, T> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create an empty history with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// The most recently appended entry.
    pub fn last(&self) -> Option<&Entry<V, T>> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry<V, T>> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Entry<V, T>] {
        &self.entries
    }

    /// Append an entry at the end, regardless of its timestamp.
    pub fn push(&mut self, timestamp: T, value: V) {
        self.entries.push(Entry::new(timestamp, value));
    }
}

impl<V, T: Ord> History<V, T> {
    /// Index of the first entry strictly after `at`.
    fn upper_bound(&self, at: &T) -> usize {
        self.entries.partition_point(|e| e.timestamp() <= at)
    }

    /// The latest entry whose timestamp is not after `at`.
    ///
    /// Returns `None` when every entry is after `at` or the history is empty.
    /// When several entries share the winning timestamp, the last one
    /// appended is returned.
    pub fn lookup(&self, at: &T) -> Option<&Entry<V, T>> {
        match self.upper_bound(at) {
            0 => None,
            i => self.entries.get(i - 1),
        }
    }

    /// Returns `true` if `timestamp` would break ascending order when pushed.
    pub fn is_out_of_order(&self, timestamp: &T) -> bool {
        self.last()
            .is_some_and(|last| timestamp < last.timestamp())
    }

    /// Insert an entry at its sorted position, after any entries with an
    /// equal timestamp.
    pub fn insert_sorted(&mut self, timestamp: T, value: V) {
        let at = self.upper_bound(&timestamp);
        self.entries.insert(at, Entry::new(timestamp, value));
    }

    /// All entries with `start <= timestamp <= end`, oldest first.
    pub fn range(&self, bounds: RangeInclusive<&T>) -> &[Entry<V, T>] {
        let (start, end) = (*bounds.start(), *bounds.end());
        if start > end {
            return &[];
        }
        let lo = self.entries.partition_point(|e| e.timestamp() < start);
        let hi = self.upper_bound(end);
        &self.entries[lo..hi.max(lo)]
    }

    /// Whether the entries are in non-decreasing timestamp order.
    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].timestamp() <= w[1].timestamp())
    }
}

impl<V, T> Default for History<V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V, T> IntoIterator for &'a History<V, T> {
    type Item = &'a Entry<V, T>;
    type IntoIter = std::slice::Iter<'a, Entry<V, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
