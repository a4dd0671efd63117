//! Canonical Huffman decoding for DEFLATE.
//!
//! DEFLATE transmits a Huffman code as nothing but the per-symbol code
//! lengths; the codes themselves are reconstructed canonically (RFC 1951
//! Section 3.2.2): codes are assigned in ascending (length, symbol) order,
//! each one numerically one above its predecessor, left-shifted when the
//! length steps up.
//!
//! Decoding runs through a two-level table. A 512-entry primary table is
//! indexed by the next 9 buffered bits; codes of up to 9 bits resolve in
//! one probe, longer codes hit a slot that points into a per-prefix
//! secondary table indexed by the remaining bits. Every entry packs the
//! symbol and its code length into one word.
//!
//! Codes are emitted MSB-first within each code while the byte stream is
//! consumed LSB-first, so each canonical code is bit-reversed by its own
//! length before it is used as a table index.

use pullflate_core::bitstream::BitReader;
use pullflate_core::buffer::ByteSource;
use pullflate_core::error::{PullflateError, Result};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LEN: usize = 15;

/// Code lengths up to this many bits resolve in a single primary probe.
const CHUNK_BITS: u32 = 9;
/// Number of primary table entries.
const CHUNK_SIZE: usize = 1 << CHUNK_BITS;
/// Low bits of an entry hold the code length.
const LENGTH_MASK: u32 = 15;
/// High bits of an entry hold the symbol (or secondary table index).
const VALUE_SHIFT: u32 = 4;
/// Length field marking a primary entry as a pointer to a secondary table.
const LINK_MARKER: u32 = CHUNK_BITS + 1;

/// A canonical Huffman decode table.
///
/// The table is rebuilt in place for every dynamic block; the primary array
/// never reallocates.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Primary lookup, indexed by the next 9 buffered bits.
    chunks: [u32; CHUNK_SIZE],
    /// Secondary tables for codes longer than 9 bits.
    links: Vec<Vec<u32>>,
    /// Mask selecting the secondary index bits.
    link_mask: u32,
    /// Shortest code length present; probes start here.
    min_code_len: u32,
}

impl HuffmanTable {
    /// Create an empty table. Every lookup on it fails until
    /// [`build`](Self::build) succeeds.
    pub fn new() -> Self {
        Self {
            chunks: [0; CHUNK_SIZE],
            links: Vec::new(),
            link_mask: 0,
            min_code_len: 0,
        }
    }

    /// Rebuild the table from per-symbol code lengths (0 = symbol absent).
    ///
    /// The lengths must form a complete prefix code, with one exception: a
    /// single symbol coded in 1 bit is accepted, mirroring the degenerate
    /// distance code some encoders emit. An all-zero vector builds an empty
    /// table rather than failing; blocks that declare such an alphabet are
    /// only in error once a symbol is actually requested from it.
    pub fn build(&mut self, lengths: &[u8]) -> Result<()> {
        self.chunks.fill(0);
        self.links.clear();
        self.link_mask = 0;
        self.min_code_len = 0;

        let mut count = [0u32; MAX_CODE_LEN + 1];
        let mut min = 0usize;
        let mut max = 0usize;
        let mut last_symbol = 0usize;
        for (symbol, &len) in lengths.iter().enumerate() {
            let len = len as usize;
            if len == 0 {
                continue;
            }
            if len > MAX_CODE_LEN {
                return Err(PullflateError::invalid_format("code length exceeds 15 bits"));
            }
            if min == 0 || len < min {
                min = len;
            }
            if len > max {
                max = len;
            }
            count[len] += 1;
            last_symbol = symbol;
        }

        if max == 0 {
            return Ok(());
        }

        let mut next_code = [0u32; MAX_CODE_LEN + 1];
        let mut code = 0u32;
        for bits in min..=max {
            code <<= 1;
            next_code[bits] = code;
            code += count[bits];
        }

        let one_symbol = code == 1 && max == 1;
        if code != (1u32 << max) && !one_symbol {
            return Err(PullflateError::invalid_format(
                "incomplete or oversubscribed huffman code",
            ));
        }

        self.min_code_len = min as u32;

        if one_symbol {
            // A one-symbol alphabet coded as a single 1-bit code: every
            // probe resolves to that symbol.
            let entry = ((last_symbol as u32) << VALUE_SHIFT) | 1;
            self.chunks.fill(entry);
            return Ok(());
        }

        if max as u32 > CHUNK_BITS {
            let num_links = 1usize << (max as u32 - CHUNK_BITS);
            self.link_mask = (num_links - 1) as u32;

            // 9-bit prefixes below this point are fully claimed by codes of
            // up to 9 bits; every remaining prefix gets a secondary table.
            let num_direct = (next_code[CHUNK_BITS as usize + 1] >> 1) as usize;
            for prefix in num_direct..CHUNK_SIZE {
                let key = reverse_bits(prefix as u32, CHUNK_BITS) as usize;
                let offset = (prefix - num_direct) as u32;
                self.chunks[key] = (offset << VALUE_SHIFT) | LINK_MARKER;
                self.links.push(vec![0u32; num_links]);
            }
        }

        for (symbol, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            let len = len as usize;
            let code = next_code[len];
            next_code[len] += 1;

            let entry = ((symbol as u32) << VALUE_SHIFT) | len as u32;
            let key_prefix = reverse_bits(code, len as u32) as usize;
            if len as u32 <= CHUNK_BITS {
                let mut key = key_prefix;
                while key < CHUNK_SIZE {
                    self.chunks[key] = entry;
                    key += 1 << len;
                }
            } else {
                let slot = self.chunks[key_prefix & (CHUNK_SIZE - 1)];
                let link = &mut self.links[(slot >> VALUE_SHIFT) as usize];
                let mut key = key_prefix >> CHUNK_BITS;
                while key < link.len() {
                    link[key] = entry;
                    key += 1 << (len as u32 - CHUNK_BITS);
                }
            }
        }

        Ok(())
    }

    /// Decode one symbol, refilling `reader` from `src` as needed.
    ///
    /// Returns the symbol and its code length **without consuming any
    /// bits**; the caller consumes them after acting on the symbol, so a
    /// suspension between the two re-decodes the identical symbol. Returns
    /// `None` when the source runs dry before the code completes, and an
    /// error when the buffered bits select an unassigned code.
    #[inline]
    pub fn lookup(
        &self,
        reader: &mut BitReader,
        src: &mut ByteSource<'_>,
    ) -> Result<Option<(u16, u32)>> {
        let mut need = self.min_code_len;
        loop {
            if !reader.ensure(need, src) {
                return Ok(None);
            }
            let mut entry = self.chunks[reader.peek(CHUNK_BITS) as usize];
            need = entry & LENGTH_MASK;
            if need > CHUNK_BITS {
                let link = &self.links[(entry >> VALUE_SHIFT) as usize];
                entry = link[((reader.peek(15) >> CHUNK_BITS) & self.link_mask) as usize];
                need = entry & LENGTH_MASK;
            }
            if need <= reader.available() {
                if need == 0 {
                    return Err(PullflateError::invalid_format("unassigned huffman code"));
                }
                return Ok(Some(((entry >> VALUE_SHIFT) as u16, need)));
            }
        }
    }
}

impl Default for HuffmanTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Reverse the low `len` bits of `code`.
#[inline]
pub fn reverse_bits(code: u32, len: u32) -> u32 {
    debug_assert!(len >= 1 && len <= 32);
    code.reverse_bits() >> (32 - len)
}
