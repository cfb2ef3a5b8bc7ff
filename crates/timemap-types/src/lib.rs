//! Foundation types for `timemap`.
//!
//! This crate provides the value types shared by the clock and the store:
//! the instant used to tag writes and the per-key history that the
//! point-in-time lookup searches.
//!
//! # Key Types
//!
//! - [`Timestamp`] -- physical/logical instant with a total order
//! - [`Entry`] -- one immutable `(timestamp, value)` pair
//! - [`History`] -- ordered entries for one key with an `O(log n)` lookup

pub mod entry;
pub mod error;
pub mod history;
pub mod timestamp;

pub use entry::Entry;
pub use error::TypeError;
pub use history::History;
pub use timestamp::Timestamp;
