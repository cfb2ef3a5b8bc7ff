//! Thread-safe point-in-time key/value store.
//!
//! Every key owns a history of `(timestamp, value)` entries. Writes append to
//! that history; reads ask "what was the value of this key as of time T" and
//! get back the latest entry not after T, found by binary search.
//!
//! # Architecture
//!
//! - **Histories** are created on a key's first write and grow by append
//!   only. A history disappears only when its key is removed or the store is
//!   cleared; there is no per-entry deletion and no eviction.
//! - **Locking**: writes take exclusive access, reads take shared access.
//!   [`TimeSeriesMap`] uses one lock for every key;
//!   [`ShardedTimeSeriesMap`] stripes keys over several.
//! - **Timestamps** are any `Ord + Clone` type. Lookups assume each key is
//!   written with non-decreasing timestamps; [`OrderingPolicy`] picks what
//!   happens when a writer breaks that.
//!
//! # Modules
//!
//! - [`error`] -- Error types for store operations
//! - [`config`] -- [`TimeMapConfig`] and [`OrderingPolicy`]
//! - [`traits`] -- The [`TimeSeriesStore`] trait defining the store interface
//! - [`memory`] -- Single-lock [`TimeSeriesMap`]
//! - [`sharded`] -- Lock-striped [`ShardedTimeSeriesMap`]

pub mod config;
pub mod error;
pub mod memory;
mod shard;
pub mod sharded;
pub mod traits;

pub use config::{OrderingPolicy, TimeMapConfig};
pub use error::{Result, TimeMapError};
pub use memory::TimeSeriesMap;
pub use sharded::ShardedTimeSeriesMap;
pub use timemap_types::{Entry, History, Timestamp};
pub use traits::TimeSeriesStore;
