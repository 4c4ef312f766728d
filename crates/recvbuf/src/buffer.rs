use crate::config::{RecvConfig, RecvMode};
use crate::error::{GrowVirtualError, WriteError};
use crate::gaps::{Gap, GapSet};
use crate::invariants::{
    debug_assert_base_monotonic, debug_assert_high_water_covers_prefix,
    debug_assert_pending_bounded, debug_assert_prefix_meets_coverage,
};
use crate::stats::{Stats, StatsSnapshot};
use crate::view::ReadView;
use circbuf::{AllocError, CircularBuffer};

/// Outcome of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Flow-control credit consumed: bytes not previously covered by any
    /// write. Zero for duplicates.
    pub quota_consumed: u64,
    /// Whether the contiguous prefix grew, i.e. new bytes became readable.
    pub ready: bool,
}

/// Point-in-time state of a [`RecvBuffer`], for tests and for callers
/// deciding their next action after an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecvSnapshot {
    pub base_offset: u64,
    pub prefix_length: u32,
    pub gaps: Vec<Gap>,
    pub written_high_water: u64,
    pub read_pending_length: u64,
    pub read_pending_offset: u64,
    pub read_start: u32,
    pub alloc_length: u32,
    pub virtual_length: u32,
    pub stats: StatsSnapshot,
}

/// Stream receive buffer.
///
/// Owns a [`CircularBuffer`] and layers stream semantics on top of it:
/// absolute offsets, gap tracking for out-of-order arrivals, flow-control
/// accounting, and the read/drain checkout protocol. See the crate docs for
/// the full protocol description.
pub struct RecvBuffer {
    ring: CircularBuffer,
    mode: RecvMode,
    /// Absolute stream offset of ring logical 0. Advanced only by drain.
    base_offset: u64,
    /// Missing ranges between the prefix edge and the high-water mark.
    gaps: GapSet,
    /// Highest absolute offset any write has reached.
    written_high_water: u64,
    /// Bytes checked out to the consumer and not yet drained.
    read_pending_length: u64,
    /// Start of the checked-out run; equals `base_offset` whenever a read
    /// is pending.
    read_pending_offset: u64,
    stats: Stats,
}

impl RecvBuffer {
    /// Creates a buffer with the configured capacities and mode.
    pub fn new(config: RecvConfig) -> Result<Self, AllocError> {
        let ring = CircularBuffer::new(config.initial_alloc, config.virtual_alloc)?;
        Ok(Self {
            ring,
            mode: config.mode,
            base_offset: 0,
            gaps: GapSet::new(),
            written_high_water: 0,
            read_pending_length: 0,
            read_pending_offset: 0,
            stats: Stats::default(),
        })
    }

    // ---------------------------------------------------------------------
    // ACCESSORS
    // ---------------------------------------------------------------------

    #[inline]
    pub fn mode(&self) -> RecvMode {
        self.mode
    }

    /// Absolute stream offset of the first buffered byte.
    #[inline]
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Length of the readable contiguous prefix.
    #[inline]
    pub fn prefix_length(&self) -> u32 {
        self.ring.prefix_length()
    }

    /// Advertised maximum capacity in bytes.
    #[inline]
    pub fn virtual_length(&self) -> u32 {
        self.ring.virtual_length()
    }

    /// Bytes currently checked out to the consumer.
    #[inline]
    pub fn read_pending_length(&self) -> u64 {
        self.read_pending_length
    }

    /// Read-only access to the underlying ring, for inspection.
    #[inline]
    pub fn ring(&self) -> &CircularBuffer {
        &self.ring
    }

    /// Operation counters since construction.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Captures the complete observable state.
    pub fn snapshot(&self) -> RecvSnapshot {
        RecvSnapshot {
            base_offset: self.base_offset,
            prefix_length: self.ring.prefix_length(),
            gaps: self.gaps.as_slice().to_vec(),
            written_high_water: self.written_high_water,
            read_pending_length: self.read_pending_length,
            read_pending_offset: self.read_pending_offset,
            read_start: self.ring.read_start(),
            alloc_length: self.ring.alloc_length(),
            virtual_length: self.ring.virtual_length(),
            stats: self.stats.snapshot(),
        }
    }

    /// End of the contiguous prefix in absolute offsets.
    #[inline]
    fn prefix_end(&self) -> u64 {
        self.base_offset + u64::from(self.ring.prefix_length())
    }

    // ---------------------------------------------------------------------
    // WRITE PATH
    // ---------------------------------------------------------------------

    /// Absorbs the byte range `[offset, offset + source.len())`.
    ///
    /// `quota` bounds how many *new* bytes the write may admit; bytes
    /// already covered by earlier writes cost nothing. Ranges at or below
    /// the drained edge succeed as no-ops, and a range straddling it is
    /// clipped to its undrained part.
    ///
    /// On success the outcome reports the credit consumed and whether the
    /// readable prefix grew. On rejection the buffer is unchanged; see
    /// [`WriteError`] for the taxonomy. The quota is checked before the
    /// virtual bound, so a write failing both reports flow control.
    pub fn write(
        &mut self,
        offset: u64,
        source: &[u8],
        quota: u64,
    ) -> Result<WriteOutcome, WriteError> {
        self.stats.writes += 1;

        let end = match offset.checked_add(source.len() as u64) {
            Some(end) => end,
            None => {
                return Err(WriteError::ExceedsVirtual {
                    end: u64::MAX,
                    virtual_length: self.ring.virtual_length(),
                })
            }
        };

        // Entirely at or below the drained edge: a duplicate of consumed
        // data.
        if end <= self.base_offset {
            return Ok(WriteOutcome {
                quota_consumed: 0,
                ready: false,
            });
        }

        // Clip the leading already-drained bytes.
        let (abs_lo, data) = if offset < self.base_offset {
            (self.base_offset, &source[(self.base_offset - offset) as usize..])
        } else {
            (offset, source)
        };
        if data.is_empty() {
            return Ok(WriteOutcome {
                quota_consumed: 0,
                ready: false,
            });
        }

        let new_bytes = self.uncovered(abs_lo, end);
        if new_bytes > quota {
            return Err(WriteError::FlowControl {
                needed: new_bytes,
                quota,
            });
        }

        let rel_end = end - self.base_offset;
        if rel_end > u64::from(self.ring.virtual_length()) {
            return Err(WriteError::ExceedsVirtual {
                end: rel_end,
                virtual_length: self.ring.virtual_length(),
            });
        }

        if rel_end > u64::from(self.ring.alloc_length()) {
            self.ring.grow_to(rel_end as u32)?;
            self.stats.ring_grows += 1;
        }

        // Placement. Overlap with already-written bytes is overwritten; the
        // byte-stream identity contract makes the bytes identical.
        let rel_lo = (abs_lo - self.base_offset) as u32;
        self.ring.write_at(rel_lo, data);

        let old_prefix_end = self.prefix_end();
        debug_assert_high_water_covers_prefix!(self.written_high_water, old_prefix_end);
        if abs_lo > self.written_high_water.max(old_prefix_end) {
            self.gaps
                .push_above(self.written_high_water.max(old_prefix_end), abs_lo);
        }
        self.gaps.subtract(abs_lo, end);
        if end > self.written_high_water {
            self.written_high_water = end;
        }

        let new_prefix_end = match self.gaps.first() {
            Some(gap) => gap.lo,
            None => self.written_high_water,
        };
        let ready = new_prefix_end > old_prefix_end;
        if ready {
            self.ring
                .set_prefix_length((new_prefix_end - self.base_offset) as u32);
        }

        self.stats.bytes_admitted += new_bytes;
        self.stats.duplicate_bytes += data.len() as u64 - new_bytes;
        self.debug_check();
        Ok(WriteOutcome {
            quota_consumed: new_bytes,
            ready,
        })
    }

    /// Bytes of `[lo, hi)` not covered by any earlier write: the overlap
    /// with tracked gaps plus anything beyond the high-water mark.
    fn uncovered(&self, lo: u64, hi: u64) -> u64 {
        self.gaps.overlap(lo, hi) + hi.saturating_sub(self.written_high_water.max(lo))
    }

    // ---------------------------------------------------------------------
    // READ / DRAIN PATH
    // ---------------------------------------------------------------------

    /// Checks out readable bytes as one or two zero-copy spans.
    ///
    /// Returns `None` when nothing can be handed out right now: the prefix
    /// is empty, a previous read is still checked out (`Single`/`Circular`),
    /// every readable byte is already claimed (`Multiple`), or a `Single`
    /// prefix wraps and cannot be linearized because the ring is already at
    /// its virtual length (or the linearizing grow failed to allocate). All
    /// of these are transient; the caller retries after writing or
    /// draining.
    ///
    /// In `Multiple` mode each call checks out the readable bytes beyond
    /// the previous checkout; [`drain`](RecvBuffer::drain) releases the
    /// combined run front-first.
    pub fn read(&mut self) -> Option<ReadView<'_>> {
        let claimed = self.read_pending_length;
        if matches!(self.mode, RecvMode::Single | RecvMode::Circular) && claimed > 0 {
            return None;
        }
        let prefix = u64::from(self.ring.prefix_length());
        if prefix == claimed {
            return None;
        }

        if matches!(self.mode, RecvMode::Single) && self.prefix_wraps() {
            self.linearize_for_single()?;
        }

        let stream_offset = self.base_offset + claimed;
        if claimed == 0 {
            self.read_pending_offset = self.base_offset;
        }
        self.read_pending_length = prefix;
        self.stats.reads += 1;
        debug_assert_pending_bounded!(
            self.read_pending_length,
            u64::from(self.ring.prefix_length())
        );

        let (first, second) = self.ring.prefix_segments_from(claimed as u32);
        Some(ReadView::new(stream_offset, first, second))
    }

    #[inline]
    fn prefix_wraps(&self) -> bool {
        self.ring.read_start() + self.ring.prefix_length() > self.ring.alloc_length()
    }

    /// Grows the ring so a wrapped prefix becomes one physical run, as
    /// `Single` mode requires. Any resize linearizes, so one doubling is
    /// always enough.
    fn linearize_for_single(&mut self) -> Option<()> {
        let alloc = self.ring.alloc_length();
        if alloc == self.ring.virtual_length() {
            return None;
        }
        self.ring.resize(alloc * 2).ok()?;
        self.stats.ring_grows += 1;
        Some(())
    }

    /// Releases the first `n` bytes of the checked-out run, advancing the
    /// stream base. Partial drains keep the remainder checked out.
    ///
    /// # Panics
    ///
    /// Panics when `n` exceeds the checked-out length: draining bytes the
    /// consumer never read is a caller bug and fails loudly.
    pub fn drain(&mut self, n: u64) {
        assert!(
            n <= self.read_pending_length,
            "drain of {n} bytes exceeds checked-out run of {}",
            self.read_pending_length
        );
        let old_base = self.base_offset;
        self.ring.drain(n as u32);
        self.base_offset += n;
        self.read_pending_length -= n;
        self.read_pending_offset = self.base_offset;
        self.stats.drains += 1;
        self.stats.bytes_drained += n;
        debug_assert_base_monotonic!(old_base, self.base_offset);
        self.debug_check();
    }

    // ---------------------------------------------------------------------
    // VIRTUAL LENGTH
    // ---------------------------------------------------------------------

    /// Raises the advertised virtual length, e.g. after the peer extends
    /// flow-control credit. Upward-only, power of two.
    pub fn grow_virtual(&mut self, new_virtual: u32) -> Result<(), GrowVirtualError> {
        if !new_virtual.is_power_of_two() || new_virtual < self.ring.virtual_length() {
            return Err(GrowVirtualError {
                requested: new_virtual,
                current: self.ring.virtual_length(),
            });
        }
        self.ring.grow_virtual(new_virtual);
        Ok(())
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert_prefix_meets_coverage!(
            self.base_offset,
            u64::from(self.ring.prefix_length()),
            self.gaps.first().map(|g| g.lo),
            self.written_high_water
        );
        debug_assert_pending_bounded!(
            self.read_pending_length,
            u64::from(self.ring.prefix_length())
        );
        self.gaps.debug_check();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_LIMIT: u64 = u64::MAX;

    fn buffer(alloc: u32, virt: u32, mode: RecvMode) -> RecvBuffer {
        RecvBuffer::new(RecvConfig::new(alloc, virt, mode)).unwrap()
    }

    #[test]
    fn test_duplicate_below_base_is_free() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        buf.write(0, b"ABCDEFGH", NO_LIMIT).unwrap();
        let n = {
            let view = buf.read().unwrap();
            view.len()
        };
        buf.drain(n);

        // Retransmission of fully consumed data.
        let out = buf.write(0, b"ABCDEFGH", NO_LIMIT).unwrap();
        assert_eq!(out, WriteOutcome { quota_consumed: 0, ready: false });
        assert_eq!(buf.base_offset(), 8);
    }

    #[test]
    fn test_straddling_write_is_clipped() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        buf.write(0, b"ABCD", NO_LIMIT).unwrap();
        let n = {
            let view = buf.read().unwrap();
            view.len()
        };
        buf.drain(n);

        // [2, 8) straddles the drained edge at 4; only [4, 8) lands.
        let out = buf.write(2, b"CDEFGH", NO_LIMIT).unwrap();
        assert_eq!(out.quota_consumed, 4);
        assert!(out.ready);
        let view = buf.read().unwrap();
        assert_eq!(view.stream_offset(), 4);
        assert_eq!(view.to_vec(), b"EFGH");
    }

    #[test]
    fn test_rewrite_of_buffered_bytes_costs_nothing() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        let first = buf.write(0, b"ABCDEFGH", NO_LIMIT).unwrap();
        assert_eq!(first.quota_consumed, 8);

        let second = buf.write(0, b"ABCDEFGH", NO_LIMIT).unwrap();
        assert_eq!(second.quota_consumed, 0);
        assert!(!second.ready);
        assert_eq!(buf.prefix_length(), 8);
        assert_eq!(buf.stats().duplicate_bytes, 8);
    }

    #[test]
    fn test_exceeds_virtual_leaves_state_unchanged() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        let err = buf.write(32, &[0u8; 64], NO_LIMIT).unwrap_err();
        assert_eq!(err, WriteError::ExceedsVirtual { end: 96, virtual_length: 64 });
        assert!(!err.is_recoverable());
        assert_eq!(err.needed_size(), None);

        let snap = buf.snapshot();
        assert_eq!(snap.written_high_water, 0);
        assert!(snap.gaps.is_empty());
        assert_eq!(snap.alloc_length, 16);
    }

    #[test]
    fn test_gap_bookkeeping_across_partial_fills() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        buf.write(10, b"KL", NO_LIMIT).unwrap();
        buf.write(4, b"EF", NO_LIMIT).unwrap();
        let snap = buf.snapshot();
        assert_eq!(
            snap.gaps,
            vec![Gap { lo: 0, hi: 4 }, Gap { lo: 6, hi: 10 }]
        );
        assert_eq!(snap.prefix_length, 0);

        // Filling the first hole makes [0, 6) readable.
        let out = buf.write(0, b"ABCD", NO_LIMIT).unwrap();
        assert!(out.ready);
        assert_eq!(buf.prefix_length(), 6);

        // Filling the second makes everything readable.
        let out = buf.write(6, b"GHIJ", NO_LIMIT).unwrap();
        assert!(out.ready);
        assert_eq!(buf.prefix_length(), 12);
        assert!(buf.snapshot().gaps.is_empty());

        let view = buf.read().unwrap();
        assert_eq!(view.to_vec(), b"ABCDEFGHIJKL");
    }

    #[test]
    fn test_multiple_mode_checks_out_disjoint_runs() {
        let mut buf = buffer(16, 64, RecvMode::Multiple);
        buf.write(0, b"ABCD", NO_LIMIT).unwrap();
        let len1 = {
            let view = buf.read().unwrap();
            assert_eq!(view.stream_offset(), 0);
            assert_eq!(view.to_vec(), b"ABCD");
            view.len()
        };

        buf.write(4, b"EFGH", NO_LIMIT).unwrap();
        let len2 = {
            let view = buf.read().unwrap();
            assert_eq!(view.stream_offset(), 4);
            assert_eq!(view.to_vec(), b"EFGH");
            view.len()
        };

        // Everything readable is claimed.
        assert!(buf.read().is_none());

        // Drains release the combined run front-first.
        buf.drain(len1);
        assert_eq!(buf.base_offset(), 4);
        buf.drain(len2);
        assert_eq!(buf.base_offset(), 8);
        assert_eq!(buf.read_pending_length(), 0);
    }

    #[test]
    fn test_single_mode_linearizes_wrapped_prefix() {
        let mut buf = buffer(16, 64, RecvMode::Single);
        buf.write(0, &[b'x'; 12], NO_LIMIT).unwrap();
        let n = {
            let view = buf.read().unwrap();
            view.len()
        };
        buf.drain(n);

        // Eight bytes from offset 12 wrap the 16-byte ring.
        buf.write(12, b"MNOPQRST", NO_LIMIT).unwrap();
        let view = buf.read().unwrap();
        assert_eq!(view.span_count(), 1);
        assert_eq!(view.spans()[0], b"MNOPQRST");
        drop(view);

        assert_eq!(buf.ring().alloc_length(), 32);
        assert_eq!(buf.ring().read_start(), 0);
    }

    #[test]
    fn test_single_mode_unavailable_at_virtual_limit() {
        let mut buf = buffer(16, 16, RecvMode::Single);
        buf.write(0, &[1u8; 12], NO_LIMIT).unwrap();
        let n = {
            let view = buf.read().unwrap();
            view.len()
        };
        buf.drain(n);

        buf.write(12, &[2u8; 8], NO_LIMIT).unwrap();
        // The prefix wraps and the ring cannot grow past its virtual length,
        // so no single span is possible.
        assert!(buf.read().is_none());
        assert_eq!(buf.prefix_length(), 8);
    }

    #[test]
    fn test_grow_virtual_validation() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        assert_eq!(
            buf.grow_virtual(60),
            Err(GrowVirtualError { requested: 60, current: 64 })
        );
        assert_eq!(
            buf.grow_virtual(32),
            Err(GrowVirtualError { requested: 32, current: 64 })
        );
        buf.grow_virtual(128).unwrap();
        assert_eq!(buf.virtual_length(), 128);

        // The raised ceiling is immediately usable.
        buf.write(0, &[9u8; 100], NO_LIMIT).unwrap();
        assert_eq!(buf.prefix_length(), 100);
    }

    #[test]
    fn test_stats_counters() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        buf.write(0, b"ABCDEFGH", NO_LIMIT).unwrap();
        buf.write(0, b"ABCD", NO_LIMIT).unwrap();
        buf.write(16, b"QRST", NO_LIMIT).unwrap();
        let n = {
            let view = buf.read().unwrap();
            view.len()
        };
        buf.drain(n);

        let stats = buf.stats();
        assert_eq!(stats.writes, 3);
        assert_eq!(stats.bytes_admitted, 12);
        assert_eq!(stats.duplicate_bytes, 4);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.drains, 1);
        assert_eq!(stats.bytes_drained, 8);
    }

    #[test]
    #[should_panic(expected = "exceeds checked-out run")]
    fn test_drain_past_pending_panics() {
        let mut buf = buffer(16, 64, RecvMode::Circular);
        buf.write(0, b"ABCD", NO_LIMIT).unwrap();
        let n = {
            let view = buf.read().unwrap();
            view.len()
        };
        buf.drain(n + 1);
    }
}
