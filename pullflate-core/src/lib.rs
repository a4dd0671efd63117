//! # Pullflate Core
//!
//! Core components for the pullflate streaming decompressor.
//!
//! This crate provides the building blocks the codec layer is assembled
//! from:
//!
//! - [`buffer`]: cursors over the caller's input and output chunks
//! - [`bitstream`]: bit-level reading over a chunked byte source
//! - [`window`]: the 32 KiB LZ77 history window and output staging buffer
//! - [`traits`]: the streaming decompressor interface
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! Pullflate is a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L2: Codec (pullflate-deflate)                           │
//! │     Huffman tables, DEFLATE state machine, zlib framing │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Plumbing (this crate)                               │
//! │     ByteSource/ByteSink, BitReader, HistoryWindow       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is pull-mode: the caller hands the decoder one input chunk
//! and one output chunk at a time, and the decoder reports whether it needs
//! more of either. No component here performs I/O.
//!
//! ## Example
//!
//! ```rust
//! use pullflate_core::buffer::ByteSource;
//! use pullflate_core::bitstream::BitReader;
//!
//! let data = [0b1010_1101u8];
//! let mut src = ByteSource::new(&data);
//! let mut reader = BitReader::new();
//! assert!(reader.ensure(4, &mut src));
//! assert_eq!(reader.peek(4), 0b1101);
//! reader.consume(4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod buffer;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use buffer::{ByteSink, ByteSource};
pub use error::{PullflateError, Result};
pub use traits::{Decompressor, InflateStatus};
pub use window::HistoryWindow;
