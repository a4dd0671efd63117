//! Zlib framing (RFC 1950) around the DEFLATE payload.
//!
//! The zlib format is a two-byte header, an optional four-byte dictionary
//! id, the DEFLATE payload, and a four-byte big-endian Adler-32 of the
//! uncompressed data:
//!
//! ```text
//! +---+---+=[DICTID]=+============+---+---+---+---+
//! |CMF|FLG|  if set  | compressed |    ADLER32    |
//! +---+---+==========+============+---+---+---+---+
//! ```
//!
//! - CMF: bits 0-3 CM (must be 8 for DEFLATE), bits 4-7 CINFO
//!   (log2(window size) - 8)
//! - FLG: bits 0-4 FCHECK so that (CMF*256 + FLG) mod 31 == 0, bit 5 FDICT,
//!   bits 6-7 FLEVEL
//!
//! This module parses the framing; it does not checksum. The trailer value
//! is handed to the caller as parsed, and comparing it against a hash of
//! the decoded bytes is the caller's job, with whatever Adler-32
//! implementation the surrounding application already has.
//!
//! The parsers are non-consuming on short input: a chunk too small to hold
//! the header or trailer is left untouched for the caller to re-present
//! once more bytes have arrived. Note the byte-order split: zlib framing is
//! big-endian while the stored-block fields inside DEFLATE are
//! little-endian.

use crate::inflate::Inflater;
use pullflate_core::buffer::{ByteSink, ByteSource};
use pullflate_core::error::{PullflateError, Result};
use pullflate_core::traits::{Decompressor, InflateStatus};

/// Compression method identifier for DEFLATE.
pub const DEFLATE_METHOD: u8 = 8;

/// FLG bit marking a preset dictionary.
const FDICT_BIT: u8 = 0b10_0000;

/// A parsed zlib stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibHeader {
    /// The raw CMF byte.
    pub cmf: u8,
    /// The raw FLG byte.
    pub flags: u8,
    /// Adler-32 of the preset dictionary, 0 when FDICT is clear.
    ///
    /// A nonzero id is surfaced as-is; whether to fail on it is the
    /// caller's call.
    pub dict_id: u32,
}

impl ZlibHeader {
    /// The compression method (CM field); 8 means DEFLATE.
    pub fn compression_method(&self) -> u8 {
        self.cmf & 0x0F
    }

    /// The declared window size in bits (CINFO + 8); at most 15 for a
    /// conforming stream.
    pub fn window_bits(&self) -> u8 {
        (self.cmf >> 4) + 8
    }

    /// True when the stream was compressed against a preset dictionary.
    pub fn has_dictionary(&self) -> bool {
        self.flags & FDICT_BIT != 0
    }

    /// True when the FCHECK bits make the header a multiple of 31.
    pub fn check_ok(&self) -> bool {
        (u16::from(self.cmf) * 256 + u16::from(self.flags)) % 31 == 0
    }
}

/// Parse the zlib header from the front of `src`.
///
/// Returns `None` without consuming anything when the chunk is too short,
/// including the case where FDICT is set and the dictionary id has not
/// fully arrived.
pub fn parse_header(src: &mut ByteSource<'_>) -> Option<ZlibHeader> {
    let first = src.peek(2)?;
    let cmf = first[0];
    let flags = first[1];

    if flags & FDICT_BIT != 0 {
        let full = src.peek(6)?;
        let dict_id = u32::from_be_bytes([full[2], full[3], full[4], full[5]]);
        src.advance(6);
        Some(ZlibHeader { cmf, flags, dict_id })
    } else {
        src.advance(2);
        Some(ZlibHeader { cmf, flags, dict_id: 0 })
    }
}

/// Parse the big-endian Adler-32 trailer from the front of `src`.
///
/// Returns `None` without consuming anything when fewer than four bytes
/// remain. The value is returned as carried in the stream; verifying it
/// against the decoded bytes is up to the caller.
pub fn parse_trailer(src: &mut ByteSource<'_>) -> Option<u32> {
    let bytes = src.peek(4)?;
    let checksum = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    src.advance(4);
    Some(checksum)
}

/// Which part of the zlib frame comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramePhase {
    Header,
    Body,
    Trailer,
    Finished,
}

/// A streaming zlib decompressor.
///
/// Composes header validation, the [`Inflater`], and trailer parsing.
/// Decoded bytes are handed back unconditionally; the parsed trailer is
/// surfaced through [`trailer`](Self::trailer) once the stream completes,
/// for the caller to compare against its own checksum of the output.
/// Preset dictionaries are rejected; parse the header yourself with
/// [`parse_header`] if you need to see the dictionary id.
///
/// Unlike the raw [`Inflater`], a [`NeedsInput`](InflateStatus::NeedsInput)
/// return may leave a few bytes unconsumed when the header or trailer is
/// split across chunks; re-present them with more data appended.
#[derive(Debug)]
pub struct ZlibDecoder {
    inflater: Inflater,
    phase: FramePhase,
    trailer: Option<u32>,
}

impl ZlibDecoder {
    /// Create a decoder expecting a fresh zlib stream.
    pub fn new() -> Self {
        Self {
            inflater: Inflater::new(),
            phase: FramePhase::Header,
            trailer: None,
        }
    }

    /// The stream's Adler-32 trailer, once the stream has completed.
    ///
    /// `None` until [`Done`](InflateStatus::Done) has been returned.
    pub fn trailer(&self) -> Option<u32> {
        self.trailer
    }

    fn check_header(header: &ZlibHeader) -> Result<()> {
        if header.compression_method() != DEFLATE_METHOD {
            return Err(PullflateError::invalid_header(
                "unsupported compression method",
            ));
        }
        if header.window_bits() > 15 {
            return Err(PullflateError::invalid_header("invalid window size"));
        }
        if !header.check_ok() {
            return Err(PullflateError::invalid_header("header check failed"));
        }
        if header.has_dictionary() {
            return Err(PullflateError::unsupported("preset dictionary"));
        }
        Ok(())
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for ZlibDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, InflateStatus)> {
        let mut src = ByteSource::new(input);
        let mut dst = ByteSink::new(output);

        loop {
            match self.phase {
                FramePhase::Header => {
                    let Some(header) = parse_header(&mut src) else {
                        return Ok((src.consumed(), dst.written(), InflateStatus::NeedsInput));
                    };
                    Self::check_header(&header)?;
                    self.phase = FramePhase::Body;
                }
                FramePhase::Body => {
                    let status = self.inflater.inflate(&mut src, &mut dst)?;
                    match status {
                        InflateStatus::Done => self.phase = FramePhase::Trailer,
                        status => return Ok((src.consumed(), dst.written(), status)),
                    }
                }
                FramePhase::Trailer => {
                    let Some(checksum) = parse_trailer(&mut src) else {
                        return Ok((src.consumed(), dst.written(), InflateStatus::NeedsInput));
                    };
                    self.trailer = Some(checksum);
                    self.phase = FramePhase::Finished;
                }
                FramePhase::Finished => {
                    return Ok((src.consumed(), dst.written(), InflateStatus::Done));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.inflater.reset();
        self.phase = FramePhase::Header;
        self.trailer = None;
    }

    fn is_finished(&self) -> bool {
        self.phase == FramePhase::Finished
    }
}

/// Decompress a complete zlib stream held in memory.
///
/// The trailer must be present for the stream to count as complete, but its
/// value is not checked here; decode through [`ZlibDecoder`] and read
/// [`ZlibDecoder::trailer`] when the caller wants to verify it.
pub fn zlib_decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new();
    let output = decoder.decompress_all(input)?;
    if !decoder.is_finished() {
        return Err(PullflateError::UnexpectedEof);
    }
    Ok(output)
}
