//! Zero-copy read checkout.

/// A checked-out run of contiguous stream bytes.
///
/// The spans borrow the ring's storage directly; while a view is alive the
/// borrow checker keeps the owning [`RecvBuffer`] immutable, so the storage
/// cannot move or be overwritten under the consumer. Once the view is
/// dropped, release the bytes with [`RecvBuffer::drain`] — until then (and
/// until the drain) the run stays checked out and, in `Single`/`Circular`
/// mode, further reads are refused.
///
/// [`RecvBuffer`]: crate::RecvBuffer
/// [`RecvBuffer::drain`]: crate::RecvBuffer::drain
#[derive(Debug)]
pub struct ReadView<'a> {
    stream_offset: u64,
    first: &'a [u8],
    second: &'a [u8],
}

impl<'a> ReadView<'a> {
    pub(crate) fn new(stream_offset: u64, first: &'a [u8], second: &'a [u8]) -> Self {
        debug_assert!(!first.is_empty(), "read views never check out zero bytes");
        Self {
            stream_offset,
            first,
            second,
        }
    }

    /// Absolute stream offset of the first byte in the view.
    #[inline]
    pub fn stream_offset(&self) -> u64 {
        self.stream_offset
    }

    /// The spans in logical order. The second is empty unless the run wraps
    /// the end of the ring.
    #[inline]
    pub fn spans(&self) -> [&'a [u8]; 2] {
        [self.first, self.second]
    }

    /// Number of non-empty spans (1 or 2).
    #[inline]
    pub fn span_count(&self) -> usize {
        1 + usize::from(!self.second.is_empty())
    }

    /// Total bytes checked out.
    #[inline]
    pub fn len(&self) -> u64 {
        (self.first.len() + self.second.len()) as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// Copies the run into one owned vector.
    ///
    /// Convenience for tests and assertions; the hot path consumes the
    /// spans in place.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.first.len() + self.second.len());
        out.extend_from_slice(self.first);
        out.extend_from_slice(self.second);
        out
    }
}
