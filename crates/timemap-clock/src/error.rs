/// Errors produced by the clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// A received timestamp is further ahead of local time than allowed.
    #[error("clock drift too large: local={local_ms}ms, received={received_ms}ms, max_drift={max_drift_ms}ms")]
    ClockDrift {
        local_ms: u64,
        received_ms: u64,
        max_drift_ms: u64,
    },

    /// No timestamp greater than the last one issued can be represented.
    #[error("clock exhausted on node {node_id}: no timestamp after (u64::MAX, u32::MAX)")]
    Exhausted { node_id: u16 },
}

/// Convenience alias used throughout the clock crate.
pub type Result<T> = std::result::Result<T, ClockError>;
