//! Debug assertion macros for receive-buffer invariants.
//!
//! Only active in debug builds (`debug_assert!`), zero overhead in release.

// =============================================================================
// INV-RB-01: Prefix edge meets coverage
// =============================================================================

/// Assert that the end of the contiguous prefix is exactly the first gap's
/// start, or the high-water mark when no gap exists.
///
/// **Invariant**: `base + prefix == first_gap.lo` (or `== high_water`)
macro_rules! debug_assert_prefix_meets_coverage {
    ($base:expr, $prefix:expr, $first_gap_lo:expr, $high_water:expr) => {
        debug_assert!(
            $base + $prefix
                == match $first_gap_lo {
                    Some(lo) => lo,
                    None => $high_water,
                },
            "INV-RB-01 violated: prefix edge {} does not meet first gap {:?} / high water {}",
            $base + $prefix,
            $first_gap_lo,
            $high_water
        )
    };
}

// =============================================================================
// INV-RB-02: Monotonic base offset
// =============================================================================

/// Assert that the stream base never moves backwards.
///
/// **Invariant**: `base_new >= base_old`
macro_rules! debug_assert_base_monotonic {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-RB-02 violated: base_offset decreased from {} to {}",
            $old,
            $new
        )
    };
}

// =============================================================================
// INV-RB-03: Checked-out run bounded by prefix
// =============================================================================

/// Assert that the consumer never holds more bytes than are readable.
///
/// **Invariant**: `read_pending_length <= prefix_length`
macro_rules! debug_assert_pending_bounded {
    ($pending:expr, $prefix:expr) => {
        debug_assert!(
            $pending <= $prefix,
            "INV-RB-03 violated: {} bytes checked out but only {} readable",
            $pending,
            $prefix
        )
    };
}

// =============================================================================
// INV-RB-04: High water covers the prefix
// =============================================================================

/// Assert that the high-water mark never falls below the prefix edge.
///
/// **Invariant**: `written_high_water >= base + prefix`
macro_rules! debug_assert_high_water_covers_prefix {
    ($high_water:expr, $prefix_end:expr) => {
        debug_assert!(
            $high_water >= $prefix_end,
            "INV-RB-04 violated: high water {} below prefix edge {}",
            $high_water,
            $prefix_end
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_base_monotonic;
pub(crate) use debug_assert_high_water_covers_prefix;
pub(crate) use debug_assert_pending_bounded;
pub(crate) use debug_assert_prefix_meets_coverage;
