//! # Pullflate Deflate
//!
//! Streaming, pull-mode DEFLATE (RFC 1951) decompression with zlib
//! (RFC 1950) framing.
//!
//! The decoder consumes compressed bytes in arbitrarily sized chunks and
//! produces uncompressed bytes in arbitrarily sized chunks; neither the
//! full input nor the full output ever has to be in memory. At any byte
//! boundary of either side it can suspend, reporting whether it needs more
//! input or more output space, and resume with no loss of state.
//!
//! ## Features
//!
//! - All three DEFLATE block types: stored, fixed Huffman, dynamic Huffman
//! - Two-level table-driven Huffman decoding
//! - Strict stream validation; corrupt input fails, it never panics
//! - Zlib header/trailer parsing, with the trailer checksum surfaced for
//!   the caller to verify against a hash of the decoded bytes
//!
//! ## Example
//!
//! ```rust
//! use pullflate_core::Decompressor;
//! use pullflate_deflate::ZlibDecoder;
//!
//! // A zlib stream holding "Hello".
//! let compressed = [
//!     0x78, 0x9C, 0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l',
//!     b'o', 0x05, 0x8C, 0x01, 0xF5,
//! ];
//!
//! let mut decoder = ZlibDecoder::new();
//! let decompressed = decoder.decompress_all(&compressed).unwrap();
//! assert_eq!(decompressed, b"Hello");
//! ```
//!
//! Compression is out of scope for this crate; pair it with any
//! DEFLATE-compliant encoder.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod huffman;
pub mod inflate;
pub mod tables;
pub mod zlib;

// Re-exports
pub use huffman::HuffmanTable;
pub use inflate::{Inflater, inflate};
pub use zlib::{ZlibDecoder, ZlibHeader, parse_header, parse_trailer, zlib_decompress};
