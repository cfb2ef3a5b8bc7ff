//! Monotonic timestamp source for `timemap`.
//!
//! The store answers point-in-time lookups with a binary search, which is
//! only correct while every key's history is written with non-decreasing
//! timestamps. [`HybridLogicalClock`] hands out strictly increasing
//! [`Timestamp`](timemap_types::Timestamp)s so writers can meet that
//! contract without coordinating among themselves.

pub mod error;
pub mod hlc;

pub use error::{ClockError, Result};
pub use hlc::HybridLogicalClock;
