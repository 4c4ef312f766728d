//! Operation counters for a receive-buffer instance.
//!
//! Plain `u64` counters: the engine is single-threaded per instance, so
//! nothing here needs atomics.

#[derive(Debug, Default)]
pub(crate) struct Stats {
    pub(crate) writes: u64,
    pub(crate) bytes_admitted: u64,
    pub(crate) duplicate_bytes: u64,
    pub(crate) reads: u64,
    pub(crate) drains: u64,
    pub(crate) bytes_drained: u64,
    pub(crate) ring_grows: u64,
}

impl Stats {
    /// Take a snapshot of the current counter values.
    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            writes: self.writes,
            bytes_admitted: self.bytes_admitted,
            duplicate_bytes: self.duplicate_bytes,
            reads: self.reads,
            drains: self.drains,
            bytes_drained: self.bytes_drained,
            ring_grows: self.ring_grows,
        }
    }
}

/// A point-in-time copy of a buffer's operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Write calls, including duplicates and no-ops.
    pub writes: u64,
    /// New bytes admitted (flow-control credit actually consumed).
    pub bytes_admitted: u64,
    /// Bytes of accepted writes that were already covered.
    pub duplicate_bytes: u64,
    /// Successful read checkouts.
    pub reads: u64,
    /// Drain calls.
    pub drains: u64,
    /// Bytes released back to the ring.
    pub bytes_drained: u64,
    /// Ring growth events (doubling resizes and read-path linearizations).
    pub ring_grows: u64,
}
