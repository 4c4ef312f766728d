//! Stream receive buffer for a reliable byte-stream transport.
//!
//! [`RecvBuffer`] absorbs byte ranges that arrive out of order, reassembles
//! them into a contiguous prefix of the stream, and hands the prefix to the
//! consumer as one or two zero-copy spans. Space is released as the consumer
//! drains. Storage is a [`circbuf::CircularBuffer`], which grows by doubling
//! up to an advertised virtual length and linearizes wrapped data when it
//! does.
//!
//! # Protocol
//!
//! - **Write**: the transport calls [`RecvBuffer::write`] with an absolute
//!   stream offset, the bytes, and a flow-control quota bounding how many
//!   *new* bytes the write may admit. Holes left by reordering are tracked
//!   as gaps; a write that fills the leftmost hole extends the readable
//!   prefix and reports `ready`.
//! - **Read**: [`RecvBuffer::read`] checks out the readable run as a
//!   [`ReadView`] of one or two spans borrowing the ring storage. The
//!   borrow keeps the buffer immutable while any span is alive.
//! - **Drain**: [`RecvBuffer::drain`] releases checked-out bytes, advancing
//!   the stream base. Partial drains keep the remainder checked out.
//!
//! [`RecvMode`] selects the read/drain discipline: `Single` (one read, one
//! coalesced span), `Circular` (one read, up to two spans), or `Multiple`
//! (successive reads of disjoint runs).
//!
//! # Example
//!
//! ```
//! use recvbuf::{RecvBuffer, RecvConfig, RecvMode};
//!
//! let mut buf = RecvBuffer::new(RecvConfig::new(16, 64, RecvMode::Circular)).unwrap();
//!
//! // Out of order: nothing readable yet.
//! let out = buf.write(4, b"world", u64::MAX).unwrap();
//! assert!(!out.ready);
//!
//! // The hole fills; nine bytes become readable.
//! let out = buf.write(0, b"hell", u64::MAX).unwrap();
//! assert!(out.ready);
//!
//! let view = buf.read().unwrap();
//! assert_eq!(view.stream_offset(), 0);
//! assert_eq!(view.to_vec(), b"hellworld");
//! let n = view.len();
//! buf.drain(n);
//! ```

mod buffer;
mod config;
mod error;
mod gaps;
mod invariants;
mod stats;
mod view;

pub use buffer::{RecvBuffer, RecvSnapshot, WriteOutcome};
pub use config::{RecvConfig, RecvMode, BULK_STREAM_CONFIG, SMALL_STREAM_CONFIG};
pub use error::{GrowVirtualError, WriteError};
pub use gaps::{Gap, GapSet};
pub use stats::StatsSnapshot;
pub use view::ReadView;

// Re-export the storage layer types that appear in this crate's API.
pub use circbuf::{AllocError, CircularBuffer};
