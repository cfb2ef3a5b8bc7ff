use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A point in time used to tag history entries.
///
/// Combines a wall-clock millisecond component with a logical counter and a
/// node identifier, so that writes landing in the same millisecond can still
/// be told apart and ordered.
///
/// Ordering: `physical_ms` → `logical` → `node_id` (total order).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Wall-clock milliseconds since UNIX epoch.
    pub physical_ms: u64,
    /// Logical counter for events at the same physical time.
    pub logical: u32,
    /// Node identifier to break ties between writers.
    pub node_id: u16,
}

impl Timestamp {
    /// Create a timestamp with explicit values.
    pub fn new(physical_ms: u64, logical: u32, node_id: u16) -> Self {
        Self {
            physical_ms,
            logical,
            node_id,
        }
    }

    /// A timestamp at the given millisecond with no logical component.
    pub fn from_millis(physical_ms: u64) -> Self {
        Self::new(physical_ms, 0, 0)
    }

    /// The current wall-clock time.
    ///
    /// Successive calls are not guaranteed to increase; use
    /// `HybridLogicalClock` when writes must be monotonic.
    pub fn now(node_id: u16) -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            node_id,
            ..Self::from_duration(since_epoch)
        }
    }

    /// A timestamp `since_epoch` after the UNIX epoch, saturating at
    /// `u64::MAX` milliseconds.
    pub fn from_duration(since_epoch: Duration) -> Self {
        let physical_ms = u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX);
        Self::from_millis(physical_ms)
    }

    /// The smallest representable timestamp.
    pub const fn zero() -> Self {
        Self {
            physical_ms: 0,
            logical: 0,
            node_id: 0,
        }
    }

    /// The largest representable timestamp. A lookup at `max()` always sees
    /// the latest entry.
    pub const fn max() -> Self {
        Self {
            physical_ms: u64::MAX,
            logical: u32::MAX,
            node_id: u16::MAX,
        }
    }

    /// Returns `true` if this timestamp is strictly after `other`.
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns `true` if this timestamp is strictly before `other`.
    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }

    /// Convert to a UTC datetime, dropping the logical and node components.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, TypeError> {
        i64::try_from(self.physical_ms)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or(TypeError::OutOfRange(self.physical_ms))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.physical_ms
            .cmp(&other.physical_ms)
            .then(self.logical.cmp(&other.logical))
            .then(self.node_id.cmp(&other.node_id))
    }
}

/// Datetimes before the UNIX epoch clamp to [`Timestamp::zero`].
impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        let ms = dt.timestamp_millis().max(0) as u64;
        Self::from_millis(ms)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timestamp({}ms.{}.n{})",
            self.physical_ms, self.logical, self.node_id
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.n{}", self.physical_ms, self.logical, self.node_id)
    }
}

/// Parses the [`Display`](fmt::Display) form `"<ms>.<logical>.n<node>"`.
impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidTimestamp(s.to_string());
        let mut parts = s.splitn(3, '.');
        let physical_ms = parts
            .next()
            .and_then(|p| p.parse::<u64>().ok())
            .ok_or_else(invalid)?;
        let logical = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let node_id = parts
            .next()
            .and_then(|p| p.strip_prefix('n'))
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(invalid)?;
        Ok(Self::new(physical_ms, logical, node_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ordering_physical_first() {
        let a = Timestamp::new(100, 5, 1);
        let b = Timestamp::new(200, 0, 0);
        assert!(a < b);
    }

    #[test]
    fn ordering_logical_second() {
        let a = Timestamp::new(100, 1, 9);
        let b = Timestamp::new(100, 2, 0);
        assert!(a < b);
    }

    #[test]
    fn ordering_node_id_third() {
        let a = Timestamp::new(100, 1, 1);
        let b = Timestamp::new(100, 1, 2);
        assert!(a < b);
    }

    #[test]
    fn equal_timestamps() {
        let a = Timestamp::new(100, 1, 1);
        let b = Timestamp::new(100, 1, 1);
        assert_eq!(a, b);
        assert!(!a.is_after(&b));
        assert!(!a.is_before(&b));
    }

    #[test]
    fn now_produces_reasonable_timestamp() {
        let ts = Timestamp::now(3);
        // Should be after 2020-01-01 (1577836800000 ms)
        assert!(ts.physical_ms > 1_577_836_800_000);
        assert_eq!(ts.logical, 0);
        assert_eq!(ts.node_id, 3);
    }

    #[test]
    fn from_duration_saturates_milliseconds() {
        assert_eq!(Timestamp::from_duration(Duration::from_millis(1_500)).physical_ms, 1_500);
        assert_eq!(Timestamp::from_duration(Duration::from_micros(2_999)).physical_ms, 2);
        // Duration::MAX is ~1.8e19 s, far past u64::MAX ms.
        assert_eq!(Timestamp::from_duration(Duration::MAX).physical_ms, u64::MAX);
    }

    #[test]
    fn zero_and_max_bound_everything() {
        let any = Timestamp::new(1, 0, 0);
        assert!(Timestamp::zero() < any);
        assert!(any < Timestamp::max());
        assert_eq!(Timestamp::default(), Timestamp::zero());
    }

    #[test]
    fn datetime_conversion() {
        let dt = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts, Timestamp::from_millis(1_700_000_000_123));
        assert_eq!(ts.to_datetime().unwrap(), dt);
    }

    #[test]
    fn pre_epoch_datetime_clamps_to_zero() {
        let dt = DateTime::<Utc>::from_timestamp_millis(-5_000).unwrap();
        assert_eq!(Timestamp::from(dt), Timestamp::zero());
    }

    #[test]
    fn to_datetime_out_of_range() {
        let err = Timestamp::from_millis(u64::MAX).to_datetime().unwrap_err();
        assert_eq!(err, TypeError::OutOfRange(u64::MAX));
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::new(1234567890, 42, 7);
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn display_format() {
        let ts = Timestamp::new(1000, 5, 3);
        assert_eq!(format!("{ts}"), "1000.5.n3");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "1000", "1000.5", "1000.5.3", "a.b.nc", "1.2.n70000"] {
            assert!(
                bad.parse::<Timestamp>().is_err(),
                "expected {bad:?} to be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(ms in any::<u64>(), logical in any::<u32>(), node in any::<u16>()) {
            let ts = Timestamp::new(ms, logical, node);
            let parsed: Timestamp = ts.to_string().parse().unwrap();
            prop_assert_eq!(parsed, ts);
        }

        #[test]
        fn order_agrees_with_tuple_order(
            a in (any::<u64>(), any::<u32>(), any::<u16>()),
            b in (any::<u64>(), any::<u32>(), any::<u16>()),
        ) {
            let ta = Timestamp::new(a.0, a.1, a.2);
            let tb = Timestamp::new(b.0, b.1, b.2);
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
        }
    }
}
