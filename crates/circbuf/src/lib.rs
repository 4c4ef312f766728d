//! Circular byte buffer with a moving read head.
//!
//! The buffer is a power-of-two-sized ring holding the tail of a byte
//! stream: a contiguous readable prefix starts at `read_start` and may wrap
//! the end of the backing store. Writes land at modular positions, drains
//! advance the head modularly, and growth replaces the backing store with a
//! larger one while *linearizing* the wrapped data back to physical index 0.
//!
//! # Invariants
//!
//! - INV-CB-01: the allocation length is a power of two and never exceeds
//!   the virtual length; it never shrinks.
//! - INV-CB-02: `read_start` is always inside the allocation.
//! - INV-CB-03: the prefix length never exceeds the allocation length.
//! - INV-CB-04: the logical byte at offset `i` lives at physical index
//!   `(read_start + i) mod alloc_length`; the modulo is computed as a
//!   bitmask, which is equivalent for power-of-two sizes.
//!
//! These are checked by debug assertions on every mutating operation and
//! exercised by the property suite in `tests/property_tests.rs`.
//!
//! # Example
//!
//! ```
//! use circbuf::CircularBuffer;
//!
//! let mut ring = CircularBuffer::new(16, 64).unwrap();
//! ring.append(b"hello world!").unwrap();
//! ring.drain(6);
//!
//! let mut out = [0u8; 6];
//! ring.read_range(&mut out);
//! assert_eq!(&out, b"world!");
//! ```

mod invariants;
mod ring;
mod wrap;

pub use ring::{AllocError, CircularBuffer};
