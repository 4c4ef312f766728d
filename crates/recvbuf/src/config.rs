/// Read/drain sequencing discipline for a receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvMode {
    /// At most one outstanding read, returned as exactly one contiguous
    /// span. A wrapped prefix is linearized by growing before the span is
    /// handed out.
    Single,
    /// At most one outstanding read, returned as up to two spans (the wrap
    /// halves). The consumer treats them as one logical run.
    Circular,
    /// Successive reads check out disjoint suffixes of the readable prefix;
    /// drains release the combined checked-out run front-first.
    Multiple,
}

/// Configuration for a [`RecvBuffer`](crate::RecvBuffer).
#[derive(Debug, Clone, Copy)]
pub struct RecvConfig {
    /// Initial allocation in bytes. Positive power of two.
    pub initial_alloc: u32,
    /// Advertised maximum in bytes. Positive power of two, at least
    /// `initial_alloc`; raisable later with `grow_virtual`.
    pub virtual_alloc: u32,
    /// Read/drain discipline.
    pub mode: RecvMode,
}

impl RecvConfig {
    /// Creates a configuration with the given capacities and mode.
    ///
    /// # Panics
    ///
    /// Panics unless both capacities are positive powers of two with
    /// `initial_alloc <= virtual_alloc`.
    pub const fn new(initial_alloc: u32, virtual_alloc: u32, mode: RecvMode) -> Self {
        assert!(
            initial_alloc.is_power_of_two(),
            "initial_alloc must be a positive power of two"
        );
        assert!(
            virtual_alloc.is_power_of_two(),
            "virtual_alloc must be a positive power of two"
        );
        assert!(
            initial_alloc <= virtual_alloc,
            "initial_alloc must not exceed virtual_alloc"
        );
        Self {
            initial_alloc,
            virtual_alloc,
            mode,
        }
    }
}

impl Default for RecvConfig {
    fn default() -> Self {
        Self {
            initial_alloc: 4096,
            virtual_alloc: 65536,
            mode: RecvMode::Circular,
        }
    }
}

/// Small-footprint configuration for short-lived or control streams.
pub const SMALL_STREAM_CONFIG: RecvConfig = RecvConfig::new(256, 4096, RecvMode::Circular);

/// Configuration for bulk-transfer streams (1 MiB ceiling).
pub const BULK_STREAM_CONFIG: RecvConfig = RecvConfig::new(16384, 1 << 20, RecvMode::Circular);
