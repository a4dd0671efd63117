//! Streaming DEFLATE decompression (RFC 1951).
//!
//! [`Inflater`] is a pull-mode decoder: the caller hands it one chunk of
//! compressed input and one chunk of output space per call, and it reports
//! which of the two ran out. It never requires the whole stream on either
//! side, and it can suspend and resume at any byte boundary of both.
//!
//! Resumption is driven by an explicit phase tag plus per-phase scratch
//! fields, not by coroutines: every phase handler treats "not enough bits
//! buffered" and "window full" as clean yields that leave the scratch state
//! ready to re-enter the same phase with identical semantics. That
//! discipline is the load-bearing property of this module.
//!
//! Decoded bytes pass through the 32 KiB [`HistoryWindow`], which serves as
//! both the LZ77 back-reference source and the output staging buffer; the
//! outer loop drains it into the caller's chunk before each decoding step.

use crate::huffman::{HuffmanTable, reverse_bits};
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_ALPHABET_SIZE, DISTANCE_EXTRA_BITS, END_OF_BLOCK,
    LENGTH_EXTRA_BITS, MAX_DISTANCE_CODES, MAX_LITLEN_CODES, decode_distance, decode_length,
    fixed_litlen_table,
};
use pullflate_core::bitstream::BitReader;
use pullflate_core::buffer::{ByteSink, ByteSource};
use pullflate_core::error::{PullflateError, Result};
use pullflate_core::traits::{Decompressor, InflateStatus};
use pullflate_core::window::HistoryWindow;

/// Where the decoder resumes on the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Read the 3-bit block header (BFINAL, BTYPE).
    ReadBlockHeader,
    /// Copy a stored block's bytes through the window.
    StoredBlock,
    /// Decode HLIT/HDIST/HCLEN and the two dynamic Huffman tables.
    DynamicHeader,
    /// Decode one literal-or-length symbol.
    LenSymbol,
    /// Decode the distance symbol that follows a length.
    DistSymbol,
    /// Execute a back-reference copy into the window.
    Copy,
}

/// Which code the current block uses for literal/length symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LitLenCode {
    /// The process-wide fixed table (RFC 1951 Section 3.2.6).
    Fixed,
    /// The table decoded from this block's header.
    Dynamic,
}

/// Which code the current block uses for distance symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DistCode {
    /// Fixed blocks: a distance is 5 raw bits, MSB-first.
    Raw,
    /// The table decoded from this block's header.
    Table,
}

/// Progress through a dynamic block header.
#[derive(Debug, Default)]
struct DynamicHeader {
    /// Literal/length codes declared (HLIT + 257).
    num_literal: usize,
    /// Distance codes declared (HDIST + 1).
    num_distance: usize,
    /// Code length codes declared (HCLEN + 4).
    num_code_len: usize,
    /// Code length code lengths read so far.
    read_code_lens: usize,
    /// Literal/length + distance code lengths decoded so far.
    read_lens: usize,
    /// The three count fields have been read.
    counts_read: bool,
    /// The code-length code has been built.
    code_table_ready: bool,
}

/// A resumable streaming DEFLATE decoder.
///
/// All state lives on the instance; the only shared data is the read-only
/// fixed literal/length table. One instance must not be used from multiple
/// threads at once, independent instances are independent. Steady-state
/// decoding allocates nothing; allocation happens at construction and when
/// a dynamic block header rebuilds the tables.
///
/// # Example
///
/// ```rust
/// use pullflate_core::{Decompressor, InflateStatus};
/// use pullflate_deflate::Inflater;
///
/// // A stored block holding "Hello".
/// let data = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
/// let mut inflater = Inflater::new();
/// let mut out = [0u8; 16];
/// let (consumed, produced, status) = inflater.decompress(&data, &mut out).unwrap();
/// assert_eq!(status, InflateStatus::Done);
/// assert_eq!(consumed, data.len());
/// assert_eq!(&out[..produced], b"Hello");
/// ```
#[derive(Debug)]
pub struct Inflater {
    phase: Phase,
    bits: BitReader,
    window: HistoryWindow,
    /// BFINAL was set on the most recent block header.
    final_block: bool,

    litlen_source: LitLenCode,
    dist_source: DistCode,
    /// Reused across blocks; also holds the code-length code while a
    /// dynamic header is being decoded.
    litlen_table: HuffmanTable,
    dist_table: HuffmanTable,

    /// Bytes left to copy in a stored block (0 = LEN/NLEN not yet read).
    stored_remaining: usize,
    /// Remaining length of a partially executed back-reference.
    copy_len: usize,
    /// Distance of a partially executed back-reference.
    copy_dist: usize,

    header: DynamicHeader,
    /// Decoded code lengths for both dynamic alphabets.
    lens: [u8; MAX_LITLEN_CODES + MAX_DISTANCE_CODES],
    /// Code lengths of the code-length code, in symbol order.
    cl_lens: [u8; CODELEN_ALPHABET_SIZE],
}

impl Inflater {
    /// Create a decoder in its initial state.
    pub fn new() -> Self {
        Self {
            phase: Phase::ReadBlockHeader,
            bits: BitReader::new(),
            window: HistoryWindow::new(),
            final_block: false,
            litlen_source: LitLenCode::Fixed,
            dist_source: DistCode::Raw,
            litlen_table: HuffmanTable::new(),
            dist_table: HuffmanTable::new(),
            stored_remaining: 0,
            copy_len: 0,
            copy_dist: 0,
            header: DynamicHeader::default(),
            lens: [0; MAX_LITLEN_CODES + MAX_DISTANCE_CODES],
            cl_lens: [0; CODELEN_ALPHABET_SIZE],
        }
    }

    /// Return to the initial state, reusing every buffer.
    pub fn reset(&mut self) {
        self.phase = Phase::ReadBlockHeader;
        self.bits.clear();
        self.window.reset();
        self.final_block = false;
        self.litlen_source = LitLenCode::Fixed;
        self.dist_source = DistCode::Raw;
        self.stored_remaining = 0;
        self.copy_len = 0;
        self.copy_dist = 0;
        self.header = DynamicHeader::default();
    }

    /// True once the final block has been decoded and fully drained.
    pub fn is_finished(&self) -> bool {
        self.final_block
            && self.phase == Phase::ReadBlockHeader
            && self.window.read_available() == 0
    }

    /// Run the decoder against one input chunk and one output chunk.
    ///
    /// Post-conditions: a [`NeedsInput`](InflateStatus::NeedsInput) return
    /// leaves `src` fully consumed; a
    /// [`NeedsOutput`](InflateStatus::NeedsOutput) return leaves `dst` with
    /// no remaining space. After [`Done`](InflateStatus::Done), further
    /// calls return `Done` without touching either buffer, so trailing
    /// bytes (a zlib trailer, say) stay with the caller.
    pub fn inflate(
        &mut self,
        src: &mut ByteSource<'_>,
        dst: &mut ByteSink<'_>,
    ) -> Result<InflateStatus> {
        loop {
            // Drain staged output before decoding any further: the window
            // must be empty-able at every step or a back-reference could
            // overwrite bytes the caller has not seen yet.
            if self.window.read_available() > 0 && !self.window.write_to(dst) {
                return Ok(InflateStatus::NeedsOutput);
            }
            if self.is_finished() {
                return Ok(InflateStatus::Done);
            }

            let step = match self.phase {
                Phase::ReadBlockHeader => self.read_block_header(src)?,
                Phase::StoredBlock => self.process_stored_block(src)?,
                Phase::DynamicHeader => self.read_dynamic_header(src)?,
                Phase::LenSymbol => self.process_len_symbol(src)?,
                Phase::DistSymbol => self.process_dist_symbol(src)?,
                Phase::Copy => self.process_copy(),
            };
            match step {
                // A handler yields NeedsOutput when the window fills, which
                // says nothing about the caller's sink; loop back to the
                // drain, which either frees the window or reports the sink
                // truly full.
                Some(InflateStatus::NeedsOutput) => continue,
                Some(status) => return Ok(status),
                None => {}
            }
        }
    }

    fn read_block_header(&mut self, src: &mut ByteSource<'_>) -> Result<Option<InflateStatus>> {
        if !self.bits.ensure(3, src) {
            return Ok(Some(InflateStatus::NeedsInput));
        }
        let header = self.bits.peek(3);
        self.bits.consume(3);
        self.final_block = header & 1 == 1;

        match header >> 1 {
            0 => {
                // A stored block restarts at the next byte boundary; the
                // remainder of the current byte is discarded.
                self.bits.clear();
                self.stored_remaining = 0;
                self.phase = Phase::StoredBlock;
            }
            1 => {
                self.litlen_source = LitLenCode::Fixed;
                self.dist_source = DistCode::Raw;
                self.copy_len = 0;
                self.copy_dist = 0;
                self.phase = Phase::LenSymbol;
            }
            2 => {
                self.header = DynamicHeader::default();
                self.phase = Phase::DynamicHeader;
            }
            _ => return Err(PullflateError::invalid_format("reserved block type")),
        }
        Ok(None)
    }

    fn process_stored_block(&mut self, src: &mut ByteSource<'_>) -> Result<Option<InflateStatus>> {
        if self.stored_remaining == 0 {
            // LEN/NLEN travel through the (byte-aligned) accumulator so
            // that a suspension mid-header never leaves bytes stranded in
            // the source.
            if !self.bits.ensure(32, src) {
                return Ok(Some(InflateStatus::NeedsInput));
            }
            let len = self.bits.peek(16);
            let nlen = self.bits.peek_after(16, 16);
            if len != !nlen & 0xFFFF {
                return Err(PullflateError::invalid_format(
                    "stored block length check failed",
                ));
            }
            self.bits.consume(32);

            if len == 0 {
                self.phase = Phase::ReadBlockHeader;
                return Ok(None);
            }
            self.stored_remaining = len as usize;
        }

        let limit = self.stored_remaining.min(src.remaining());
        let written = self.window.write_from(src, limit);
        self.stored_remaining -= written;
        if written < limit {
            return Ok(Some(InflateStatus::NeedsOutput));
        }
        if self.stored_remaining > 0 {
            return Ok(Some(InflateStatus::NeedsInput));
        }
        self.phase = Phase::ReadBlockHeader;
        Ok(None)
    }

    fn process_len_symbol(&mut self, src: &mut ByteSource<'_>) -> Result<Option<InflateStatus>> {
        let table = match self.litlen_source {
            LitLenCode::Fixed => fixed_litlen_table(),
            LitLenCode::Dynamic => &self.litlen_table,
        };
        loop {
            let Some((symbol, code_len)) = table.lookup(&mut self.bits, src)? else {
                return Ok(Some(InflateStatus::NeedsInput));
            };

            if symbol < 256 {
                if self.window.write_available() == 0 {
                    return Ok(Some(InflateStatus::NeedsOutput));
                }
                self.window.write(symbol as u8);
                self.bits.consume(code_len);
                continue;
            }
            if symbol == END_OF_BLOCK {
                self.bits.consume(code_len);
                self.phase = Phase::ReadBlockHeader;
                return Ok(None);
            }
            if symbol as usize >= MAX_LITLEN_CODES {
                // 286 and 287 participate in the fixed code but never in a
                // valid stream.
                return Err(PullflateError::invalid_format(
                    "invalid literal/length symbol",
                ));
            }

            let extra = u32::from(LENGTH_EXTRA_BITS[(symbol - 257) as usize]);
            if extra > 0 && !self.bits.ensure(code_len + extra, src) {
                return Ok(Some(InflateStatus::NeedsInput));
            }
            let length = decode_length(symbol, self.bits.peek_after(code_len, extra) as u16);
            self.bits.consume(code_len + extra);

            self.copy_len = length as usize;
            self.phase = Phase::DistSymbol;
            return Ok(None);
        }
    }

    fn process_dist_symbol(&mut self, src: &mut ByteSource<'_>) -> Result<Option<InflateStatus>> {
        let (code, code_len) = match self.dist_source {
            DistCode::Raw => {
                if !self.bits.ensure(5, src) {
                    return Ok(Some(InflateStatus::NeedsInput));
                }
                (reverse_bits(self.bits.peek(5), 5) as u16, 5u32)
            }
            DistCode::Table => match self.dist_table.lookup(&mut self.bits, src)? {
                Some(entry) => entry,
                None => return Ok(Some(InflateStatus::NeedsInput)),
            },
        };
        if code as usize >= MAX_DISTANCE_CODES {
            return Err(PullflateError::invalid_format("invalid distance symbol"));
        }

        let extra = u32::from(DISTANCE_EXTRA_BITS[code as usize]);
        if extra > 0 && !self.bits.ensure(code_len + extra, src) {
            return Ok(Some(InflateStatus::NeedsInput));
        }
        let distance = decode_distance(code, self.bits.peek_after(code_len, extra) as u16) as usize;
        if distance > self.window.history_size() {
            return Err(PullflateError::invalid_format(
                "distance exceeds available history",
            ));
        }
        self.bits.consume(code_len + extra);

        self.copy_dist = distance;
        self.phase = Phase::Copy;
        Ok(None)
    }

    fn process_copy(&mut self) -> Option<InflateStatus> {
        if self.window.write_available() == 0 {
            return Some(InflateStatus::NeedsOutput);
        }
        if self.copy_len > 0 {
            let written = self.window.write_copy(self.copy_dist, self.copy_len);
            self.copy_len -= written;
            if self.window.write_available() == 0 || self.copy_len > 0 {
                return Some(InflateStatus::NeedsOutput);
            }
        }
        self.copy_len = 0;
        self.copy_dist = 0;
        self.phase = Phase::LenSymbol;
        None
    }

    fn read_dynamic_header(&mut self, src: &mut ByteSource<'_>) -> Result<Option<InflateStatus>> {
        if !self.header.counts_read {
            if !self.bits.ensure(5 + 5 + 4, src) {
                return Ok(Some(InflateStatus::NeedsInput));
            }
            let fields = self.bits.peek(14);
            let num_literal = (fields & 0x1F) as usize + 257;
            let num_distance = ((fields >> 5) & 0x1F) as usize + 1;
            if num_literal > MAX_LITLEN_CODES {
                return Err(PullflateError::invalid_format(
                    "too many literal/length codes",
                ));
            }
            if num_distance > MAX_DISTANCE_CODES {
                return Err(PullflateError::invalid_format("too many distance codes"));
            }
            self.bits.consume(14);

            self.header.num_literal = num_literal;
            self.header.num_distance = num_distance;
            self.header.num_code_len = ((fields >> 10) & 0x0F) as usize + 4;
            self.header.counts_read = true;
        }

        if !self.header.code_table_ready {
            while self.header.read_code_lens < self.header.num_code_len {
                if !self.bits.ensure(3, src) {
                    return Ok(Some(InflateStatus::NeedsInput));
                }
                self.cl_lens[CODE_LENGTH_ORDER[self.header.read_code_lens]] =
                    self.bits.peek(3) as u8;
                self.bits.consume(3);
                self.header.read_code_lens += 1;
            }
            for &slot in &CODE_LENGTH_ORDER[self.header.num_code_len..] {
                self.cl_lens[slot] = 0;
            }

            // The literal/length table doubles as the code-length table
            // while the header is decoded; it is rebuilt with the real
            // lengths once they are known.
            self.litlen_table.build(&self.cl_lens)?;
            self.header.code_table_ready = true;
        }

        let total = self.header.num_literal + self.header.num_distance;
        while self.header.read_lens < total {
            let Some((symbol, code_len)) = self.litlen_table.lookup(&mut self.bits, src)? else {
                return Ok(Some(InflateStatus::NeedsInput));
            };

            if symbol < 16 {
                self.lens[self.header.read_lens] = symbol as u8;
                self.bits.consume(code_len);
                self.header.read_lens += 1;
                continue;
            }

            let (base_repeat, extra, fill) = match symbol {
                16 => {
                    if self.header.read_lens == 0 {
                        return Err(PullflateError::invalid_format(
                            "length repeat with no previous length",
                        ));
                    }
                    (3u32, 2u32, self.lens[self.header.read_lens - 1])
                }
                17 => (3, 3, 0),
                18 => (11, 7, 0),
                _ => unreachable!("code length alphabet has 19 symbols"),
            };
            if !self.bits.ensure(code_len + extra, src) {
                return Ok(Some(InflateStatus::NeedsInput));
            }
            let repeat = (base_repeat + self.bits.peek_after(code_len, extra)) as usize;
            if self.header.read_lens + repeat > total {
                return Err(PullflateError::invalid_format(
                    "code length run overflows alphabet",
                ));
            }
            self.bits.consume(code_len + extra);

            self.lens[self.header.read_lens..self.header.read_lens + repeat].fill(fill);
            self.header.read_lens += repeat;
        }

        self.litlen_table.build(&self.lens[..self.header.num_literal])?;
        self.dist_table.build(&self.lens[self.header.num_literal..total])?;
        self.litlen_source = LitLenCode::Dynamic;
        self.dist_source = DistCode::Table;
        self.copy_len = 0;
        self.copy_dist = 0;
        self.phase = Phase::LenSymbol;
        Ok(None)
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, InflateStatus)> {
        let mut src = ByteSource::new(input);
        let mut dst = ByteSink::new(output);
        let status = self.inflate(&mut src, &mut dst)?;
        Ok((src.consumed(), dst.written(), status))
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        Inflater::is_finished(self)
    }
}

/// Decompress a complete raw DEFLATE stream held in memory.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new();
    let output = inflater.decompress_all(data)?;
    if !inflater.is_finished() {
        return Err(PullflateError::UnexpectedEof);
    }
    Ok(output)
}
