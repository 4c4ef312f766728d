//! Error types for receive-buffer operations.

use circbuf::AllocError;
use thiserror::Error;

/// Errors surfaced by [`RecvBuffer::write`](crate::RecvBuffer::write).
///
/// Every rejection leaves the buffer unchanged and carries the numbers the
/// caller needs to decide its next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The range would admit more new bytes than the caller's flow-control
    /// quota allows. `needed` is the credit the write would cost.
    #[error("write needs {needed} new bytes but the quota allows {quota}")]
    FlowControl { needed: u64, quota: u64 },

    /// The range ends past the advertised virtual length. The caller must
    /// raise the bound with `grow_virtual` or drop the connection.
    #[error("write ends at relative offset {end}, past the virtual length {virtual_length}")]
    ExceedsVirtual { end: u64, virtual_length: u32 },

    /// Growing the ring failed; `needed` is the power-of-two capacity the
    /// write required.
    #[error("allocation failed growing the ring to {needed} bytes")]
    Alloc { needed: u32 },
}

impl WriteError {
    /// Returns `true` when retrying later (after extending credit or
    /// draining) can succeed without changing the stream's advertised
    /// bounds.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FlowControl { .. } | Self::Alloc { .. })
    }

    /// The credit or capacity that would have let the write through, when
    /// the rejection was about capacity only.
    #[inline]
    pub fn needed_size(&self) -> Option<u64> {
        match self {
            Self::FlowControl { needed, .. } => Some(*needed),
            Self::Alloc { needed } => Some(u64::from(*needed)),
            Self::ExceedsVirtual { .. } => None,
        }
    }
}

impl From<AllocError> for WriteError {
    fn from(err: AllocError) -> Self {
        Self::Alloc {
            needed: err.requested,
        }
    }
}

/// Error returned by [`RecvBuffer::grow_virtual`](crate::RecvBuffer::grow_virtual)
/// for a bound that is not a power of two or would shrink the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid virtual length {requested}: must be a power of two >= {current}")]
pub struct GrowVirtualError {
    /// The rejected new bound.
    pub requested: u32,
    /// The current bound, which stays in effect.
    pub current: u32,
}
