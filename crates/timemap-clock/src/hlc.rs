use std::sync::{Mutex, MutexGuard, PoisonError};

use timemap_types::Timestamp;
use tracing::warn;

use crate::error::{ClockError, Result};

/// Internal mutable state of the Hybrid Logical Clock.
struct HlcState {
    /// Last-issued physical millisecond timestamp.
    physical_ms: u64,
    /// Logical counter for timestamps within the same physical millisecond.
    logical: u32,
}

/// Hybrid Logical Clock issuing strictly increasing [`Timestamp`]s.
///
/// Writers that stamp every `set` with `clock.now()` satisfy the store's
/// non-decreasing timestamp contract even when the wall clock stalls or steps
/// backwards. Safe for concurrent use across threads via an internal
/// [`Mutex`].
///
/// # HLC Rules
///
/// - **Local event**: `physical = max(wall_clock, state.physical)`.
///   If physical advanced, `logical = 0`; otherwise `logical += 1`.
/// - **Receive**: `physical = max(wall_clock, state.physical, received.physical)`,
///   with logical adjusted to be strictly greater than both local and received
///   counters when the physical component ties.
/// - **Overflow**: a full logical counter carries into the physical
///   component. Only `(u64::MAX, u32::MAX)` has no successor; the fallible
///   forms report [`ClockError::Exhausted`] there.
/// - **Guarantee**: timestamps are monotonic and preserve causal ordering.
pub struct HybridLogicalClock {
    node_id: u16,
    /// Remote timestamps further ahead of the wall clock than this are
    /// refused by [`try_update`](Self::try_update).
    max_drift_ms: Option<u64>,
    state: Mutex<HlcState>,
}

impl HybridLogicalClock {
    /// Create a new HLC for the given node.
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id,
            max_drift_ms: None,
            state: Mutex::new(HlcState {
                physical_ms: 0,
                logical: 0,
            }),
        }
    }

    /// Create an HLC that refuses remote timestamps more than `max_drift_ms`
    /// ahead of local wall-clock time.
    pub fn with_max_drift(node_id: u16, max_drift_ms: u64) -> Self {
        Self {
            max_drift_ms: Some(max_drift_ms),
            ..Self::new(node_id)
        }
    }

    /// Generate a new timestamp for a local write.
    ///
    /// The returned [`Timestamp`] is strictly greater than any previously
    /// returned value from this clock until the clock is exhausted, after
    /// which it stays pinned at the largest value it can issue. Use
    /// [`try_now`](Self::try_now) to detect exhaustion.
    pub fn now(&self) -> Timestamp {
        self.try_now().unwrap_or_else(|e| self.saturated(&e))
    }

    /// Like [`now`](Self::now), but fails with [`ClockError::Exhausted`]
    /// instead of repeating a timestamp.
    pub fn try_now(&self) -> Result<Timestamp> {
        let wall = Self::wall_clock_ms();
        let mut state = self.lock();

        let next = if wall > state.physical_ms {
            Some((wall, 0))
        } else {
            successor(state.physical_ms, state.logical)
        };
        self.advance(&mut state, next)
    }

    /// Merge a timestamp produced elsewhere, returning a new timestamp that
    /// is strictly greater than both the local state and `received`.
    ///
    /// Saturates like [`now`](Self::now) when no such timestamp exists.
    pub fn update(&self, received: &Timestamp) -> Timestamp {
        self.merge(received).unwrap_or_else(|e| self.saturated(&e))
    }

    /// Like [`update`](Self::update), but refuses `received` if it is further
    /// ahead of the wall clock than the configured drift bound, or if no
    /// timestamp greater than it can be issued. The clock state is left
    /// untouched on refusal.
    pub fn try_update(&self, received: &Timestamp) -> Result<Timestamp> {
        if let Some(max_drift_ms) = self.max_drift_ms {
            let local_ms = Self::wall_clock_ms();
            if received.physical_ms.saturating_sub(local_ms) > max_drift_ms {
                warn!(
                    local_ms,
                    received_ms = received.physical_ms,
                    max_drift_ms,
                    "refusing remote timestamp"
                );
                return Err(ClockError::ClockDrift {
                    local_ms,
                    received_ms: received.physical_ms,
                    max_drift_ms,
                });
            }
        }
        self.merge(received)
    }

    fn merge(&self, received: &Timestamp) -> Result<Timestamp> {
        let wall = Self::wall_clock_ms();
        let mut state = self.lock();

        let new_physical = wall.max(state.physical_ms).max(received.physical_ms);

        let next = if new_physical > state.physical_ms && new_physical > received.physical_ms {
            Some((new_physical, 0))
        } else if new_physical == state.physical_ms && new_physical == received.physical_ms {
            successor(new_physical, state.logical.max(received.logical))
        } else if new_physical == state.physical_ms {
            successor(new_physical, state.logical)
        } else {
            successor(new_physical, received.logical)
        };
        self.advance(&mut state, next)
    }

    /// Commit `next` as the new state, or report exhaustion without touching
    /// the state.
    fn advance(&self, state: &mut HlcState, next: Option<(u64, u32)>) -> Result<Timestamp> {
        let (physical_ms, logical) = next.ok_or(ClockError::Exhausted {
            node_id: self.node_id,
        })?;
        state.physical_ms = physical_ms;
        state.logical = logical;
        Ok(Timestamp::new(physical_ms, logical, self.node_id))
    }

    fn saturated(&self, error: &ClockError) -> Timestamp {
        warn!(node_id = self.node_id, %error, "clock saturated");
        let mut state = self.lock();
        state.physical_ms = u64::MAX;
        state.logical = u32::MAX;
        Timestamp::new(u64::MAX, u32::MAX, self.node_id)
    }

    /// The most recently issued timestamp, or [`Timestamp::zero`] if none.
    pub fn last(&self) -> Timestamp {
        let state = self.lock();
        Timestamp::new(state.physical_ms, state.logical, self.node_id)
    }

    /// The node identifier this clock was created with.
    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    // The state is two integers written together, so a panic elsewhere
    // cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, HlcState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wall_clock_ms() -> u64 {
        Timestamp::now(0).physical_ms
    }
}

/// The next `(physical, logical)` pair after the given one. A full logical
/// counter carries into the physical component; `None` once both are full.
fn successor(physical_ms: u64, logical: u32) -> Option<(u64, u32)> {
    match logical.checked_add(1) {
        Some(logical) => Some((physical_ms, logical)),
        None => physical_ms.checked_add(1).map(|physical_ms| (physical_ms, 0)),
    }
}

impl std::fmt::Debug for HybridLogicalClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridLogicalClock")
            .field("node_id", &self.node_id)
            .field("max_drift_ms", &self.max_drift_ms)
            .field("last", &self.last())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_across_rapid_calls() {
        let hlc = HybridLogicalClock::new(1);
        let mut prev = hlc.now();
        for _ in 0..1000 {
            let next = hlc.now();
            assert!(next > prev, "HLC must be strictly monotonic: {prev:?} >= {next:?}");
            prev = next;
        }
    }

    #[test]
    fn logical_increments_within_same_physical() {
        let hlc = HybridLogicalClock::new(1);
        // Pin the physical component far in the future so the wall clock never wins.
        {
            let mut state = hlc.state.lock().unwrap();
            state.physical_ms = u64::MAX;
            state.logical = 0;
        }
        let t1 = hlc.now();
        let t2 = hlc.now();

        assert_eq!(t1.physical_ms, u64::MAX);
        assert_eq!(t1.logical, 1);
        assert_eq!(t2.logical, 2);
        assert!(t1 < t2);
    }

    #[test]
    fn node_id_is_preserved() {
        let hlc = HybridLogicalClock::new(42);
        let ts = hlc.now();
        assert_eq!(ts.node_id, 42);
        assert_eq!(hlc.node_id(), 42);
    }

    #[test]
    fn last_tracks_issued_timestamp() {
        let hlc = HybridLogicalClock::new(5);
        assert_eq!(hlc.last().physical_ms, 0);
        let ts = hlc.now();
        assert_eq!(hlc.last(), ts);
    }

    #[test]
    fn update_advances_past_received() {
        let hlc = HybridLogicalClock::new(1);
        let remote = Timestamp::new(u64::MAX - 1, 10, 2);
        let updated = hlc.update(&remote);
        assert!(updated > remote, "updated must be > received: {updated:?} vs {remote:?}");
        assert!(hlc.now() > updated);
    }

    #[test]
    fn update_when_local_is_ahead() {
        let hlc = HybridLogicalClock::new(1);
        {
            let mut state = hlc.state.lock().unwrap();
            state.physical_ms = u64::MAX;
            state.logical = 100;
        }
        let updated = hlc.update(&Timestamp::new(1000, 5, 2));

        assert_eq!(updated.physical_ms, u64::MAX);
        assert_eq!(updated.logical, 101);
        assert_eq!(updated.node_id, 1);
    }

    #[test]
    fn update_when_all_three_tie() {
        let hlc = HybridLogicalClock::new(1);
        {
            let mut state = hlc.state.lock().unwrap();
            state.physical_ms = u64::MAX;
            state.logical = 5;
        }
        let updated = hlc.update(&Timestamp::new(u64::MAX, 10, 2));

        assert_eq!(updated.physical_ms, u64::MAX);
        // max(5, 10) + 1
        assert_eq!(updated.logical, 11);
    }

    #[test]
    fn try_update_refuses_excessive_drift() {
        let hlc = HybridLogicalClock::with_max_drift(1, 1_000);
        let before = hlc.last();
        let remote = Timestamp::new(u64::MAX, 0, 2);

        let err = hlc.try_update(&remote).unwrap_err();
        assert!(matches!(err, ClockError::ClockDrift { max_drift_ms: 1_000, .. }));
        assert_eq!(hlc.last(), before);
    }

    #[test]
    fn try_update_accepts_past_and_near_timestamps() {
        let hlc = HybridLogicalClock::with_max_drift(1, 60_000);
        let remote = Timestamp::new(1_000, 3, 2);
        let updated = hlc.try_update(&remote).unwrap();
        assert!(updated > remote);

        let unbounded = HybridLogicalClock::new(1);
        assert!(unbounded.try_update(&Timestamp::new(u64::MAX, 0, 2)).is_ok());
    }

    #[test]
    fn full_logical_counter_carries_into_physical() {
        let hlc = HybridLogicalClock::new(1);
        {
            let mut state = hlc.state.lock().unwrap();
            state.physical_ms = u64::MAX - 1;
            state.logical = u32::MAX;
        }
        let before = hlc.last();
        let next = hlc.now();

        assert_eq!(next, Timestamp::new(u64::MAX, 0, 1));
        assert!(next > before);
    }

    #[test]
    fn update_carries_past_full_remote_counter() {
        let hlc = HybridLogicalClock::new(1);
        let remote = Timestamp::new(u64::MAX - 1, u32::MAX, 2);
        let updated = hlc.update(&remote);

        assert_eq!(updated, Timestamp::new(u64::MAX, 0, 1));
        assert!(updated > remote);
    }

    #[test]
    fn update_with_max_timestamp_saturates() {
        let hlc = HybridLogicalClock::new(1);
        let updated = hlc.update(&Timestamp::max());

        assert_eq!(updated.physical_ms, u64::MAX);
        assert_eq!(updated.logical, u32::MAX);
        assert_eq!(hlc.last(), updated);
        // Pinned from here on.
        assert_eq!(hlc.now(), updated);
    }

    #[test]
    fn try_update_reports_exhaustion() {
        let hlc = HybridLogicalClock::new(3);
        let before = hlc.last();

        let err = hlc
            .try_update(&Timestamp::new(u64::MAX, u32::MAX, 0))
            .unwrap_err();
        assert!(matches!(err, ClockError::Exhausted { node_id: 3 }));
        assert_eq!(hlc.last(), before);
    }

    #[test]
    fn now_at_the_last_representable_instant() {
        let hlc = HybridLogicalClock::new(1);
        {
            let mut state = hlc.state.lock().unwrap();
            state.physical_ms = u64::MAX;
            state.logical = u32::MAX;
        }

        assert!(matches!(hlc.try_now(), Err(ClockError::Exhausted { .. })));
        assert_eq!(hlc.now(), Timestamp::new(u64::MAX, u32::MAX, 1));
    }

    #[test]
    fn concurrent_now_calls_are_unique() {
        use std::sync::Arc;
        use std::thread;

        let hlc = Arc::new(HybridLogicalClock::new(1));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let hlc = Arc::clone(&hlc);
                thread::spawn(move || (0..100).map(|_| hlc.now()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<Timestamp> = Vec::new();
        for handle in handles {
            let stamps = handle.join().unwrap();
            assert!(stamps.windows(2).all(|w| w[0] < w[1]));
            all.extend(stamps);
        }

        let len = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), len, "all timestamps must be unique across threads");
    }
}
