//! The LZ77 history window and output staging buffer.
//!
//! DEFLATE back-references reach up to 32 KiB into already-decoded output,
//! so the decoder keeps the most recent window of output around. This
//! buffer plays both roles at once: bytes are produced into it, drained
//! from it into the caller's output chunk, and re-read from it by later
//! back-references.
//!
//! Because pending output and back-reference history share storage, the
//! window never wraps while undrained bytes remain: the cursors reset to
//! the start only at the moment the buffer is both completely full and
//! completely drained. From then on the previous contents stay addressable
//! as history, and `history_size()` saturates at the full window.

use crate::buffer::{ByteSink, ByteSource};

/// Size of the DEFLATE history window (32 KiB).
pub const WINDOW_SIZE: usize = 1 << 15;

/// A 32 KiB circular buffer of recently produced bytes.
#[derive(Debug)]
pub struct HistoryWindow {
    history: Box<[u8]>,
    /// Next byte is produced here.
    write_pos: usize,
    /// Next byte is drained from here.
    read_pos: usize,
    /// Set once the buffer has wrapped; the whole window is then history.
    full: bool,
}

impl HistoryWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            history: vec![0u8; WINDOW_SIZE].into_boxed_slice(),
            write_pos: 0,
            read_pos: 0,
            full: false,
        }
    }

    /// Return to the initial state, keeping the allocation.
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
        self.full = false;
    }

    /// Number of bytes of history a back-reference may reach into.
    #[inline]
    pub fn history_size(&self) -> usize {
        if self.full {
            WINDOW_SIZE
        } else {
            self.write_pos
        }
    }

    /// Number of produced bytes not yet drained to the caller.
    #[inline]
    pub fn read_available(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Number of bytes that can be produced before the window must drain.
    #[inline]
    pub fn write_available(&self) -> usize {
        WINDOW_SIZE - self.write_pos
    }

    /// Append one literal byte.
    ///
    /// Precondition: `write_available() > 0`.
    #[inline]
    pub fn write(&mut self, byte: u8) {
        debug_assert!(self.write_available() > 0);
        self.history[self.write_pos] = byte;
        self.write_pos += 1;
    }

    /// Copy `len` bytes from `dist` bytes back in the produced stream.
    ///
    /// Returns the number of bytes actually copied, which is less than
    /// `len` when the write cursor reaches the end of the buffer; the
    /// caller drains and calls again with the remainder. A copy with
    /// `dist < len` re-reads its own freshly written bytes, per RFC 1951.
    ///
    /// Precondition: `1 <= dist <= history_size()`.
    pub fn write_copy(&mut self, dist: usize, len: usize) -> usize {
        debug_assert!(dist >= 1 && dist <= self.history_size());

        let dst_base = self.write_pos;
        let mut dst_pos = dst_base;
        let end_pos = (dst_pos + len).min(WINDOW_SIZE);

        let mut src_pos = dst_pos as isize - dist as isize;
        if src_pos < 0 {
            // The reference starts in the tail left over from the previous
            // wrap; consume it, then continue from the buffer start.
            let from = (src_pos + WINDOW_SIZE as isize) as usize;
            let n = (WINDOW_SIZE - from).min(end_pos - dst_pos);
            self.history.copy_within(from..from + n, dst_pos);
            dst_pos += n;
            src_pos = 0;
        }

        // Spans never overlap: each copy reads at most `dst_pos - src_pos`
        // bytes, and the readable span doubles as the copy proceeds, which
        // is what propagates self-overlapping references.
        let src_pos = src_pos as usize;
        while dst_pos < end_pos {
            let span = (end_pos - dst_pos).min(dst_pos - src_pos);
            self.history.copy_within(src_pos..src_pos + span, dst_pos);
            dst_pos += span;
        }

        self.write_pos = dst_pos;
        dst_pos - dst_base
    }

    /// Bulk-copy up to `limit` bytes from `src` into the window.
    ///
    /// Returns the number of bytes written, capped by the source's
    /// remaining bytes and the window's write space. Stored blocks are
    /// funnelled through here.
    pub fn write_from(&mut self, src: &mut ByteSource<'_>, limit: usize) -> usize {
        let chunk = src.take(limit.min(self.write_available()));
        self.history[self.write_pos..self.write_pos + chunk.len()].copy_from_slice(chunk);
        self.write_pos += chunk.len();
        chunk.len()
    }

    /// Drain produced bytes into `dst`, advancing the read cursor.
    ///
    /// Returns `true` when nothing is left to drain. When the drain
    /// completes with the write cursor at the buffer end, both cursors
    /// reset and the window is marked wrapped.
    pub fn write_to(&mut self, dst: &mut ByteSink<'_>) -> bool {
        let n = dst.append(&self.history[self.read_pos..self.write_pos]);
        self.read_pos += n;

        if self.read_pos == self.write_pos && self.write_pos == WINDOW_SIZE {
            self.read_pos = 0;
            self.write_pos = 0;
            self.full = true;
        }
        self.read_available() == 0
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}
