//! The streaming decompressor interface.

use crate::error::Result;

/// Outcome of one streaming decompression step.
///
/// Running out of input or output is a status, never an error: the caller
/// refills the input chunk or drains the output chunk and calls again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateStatus {
    /// The input chunk is fully consumed and more compressed bytes are
    /// needed to make progress.
    NeedsInput,
    /// The output chunk is full and must be drained before more bytes can
    /// be produced.
    NeedsOutput,
    /// The stream is complete; further calls keep returning `Done`.
    Done,
}

/// A resumable streaming decompressor.
///
/// Implementations must be able to suspend at any byte boundary of either
/// buffer and resume with different chunk sizes without changing the
/// produced byte sequence.
pub trait Decompressor {
    /// Decompress from `input` into `output`.
    ///
    /// Returns `(bytes consumed, bytes produced, status)`.
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, InflateStatus)>;

    /// Return the decompressor to its initial state, reusing buffers.
    fn reset(&mut self);

    /// True once the end of the stream has been reached.
    fn is_finished(&self) -> bool;

    /// Decompress a complete in-memory stream (convenience method).
    ///
    /// Stops early if `input` ends before the stream does, or once a call
    /// can make no further progress from what remains; check
    /// [`is_finished`](Self::is_finished) when that matters.
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) = self.decompress(&input[pos..], &mut buffer)?;
            pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            match status {
                InflateStatus::Done => break,
                InflateStatus::NeedsInput
                    if pos >= input.len() || (consumed == 0 && produced == 0) =>
                {
                    break;
                }
                InflateStatus::NeedsInput | InflateStatus::NeedsOutput => continue,
            }
        }

        Ok(output)
    }
}
