//! Rejection of corrupt streams.
//!
//! Each vector here is a hand-assembled DEFLATE stream violating one rule
//! of RFC 1951. Every one must fail with `InvalidFormat`, never a panic
//! and never silent wrong output.

use pullflate_core::Decompressor;
use pullflate_core::error::PullflateError;
use pullflate_deflate::{Inflater, inflate};

fn assert_invalid(data: &[u8]) {
    match inflate(data) {
        Err(PullflateError::InvalidFormat { .. }) => {}
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

#[test]
fn test_reserved_block_type() {
    // BFINAL=1, BTYPE=11.
    assert_invalid(&[0x07]);
}

#[test]
fn test_stored_len_nlen_mismatch() {
    // LEN=5 but NLEN=0x0000 instead of 0xFFFA.
    assert_invalid(&[0x01, 0x05, 0x00, 0x00, 0x00]);
}

#[test]
fn test_too_many_litlen_codes() {
    // Dynamic block with HLIT=30, declaring 287 literal/length codes.
    assert_invalid(&[0xF5, 0x00]);
}

#[test]
fn test_too_many_distance_codes() {
    // Dynamic block with HDIST=30, declaring 31 distance codes.
    assert_invalid(&[0x05, 0x1E]);
}

#[test]
fn test_length_repeat_without_previous_length() {
    // Dynamic block whose code-length stream opens with symbol 16
    // (copy-previous) before any length exists.
    assert_invalid(&[0x05, 0x00, 0x02, 0x09]);
}

#[test]
fn test_oversubscribed_code_length_code() {
    // Three code-length symbols all coded in 1 bit.
    assert_invalid(&[0x05, 0x00, 0x92, 0x00]);
}

#[test]
fn test_code_length_run_overflow() {
    // Two zero-runs of 138 overflow the 258 declared code lengths.
    assert_invalid(&[
        0x05, 0xE0, 0x81, 0x08, 0x00, 0x00, 0x00, 0x00, 0x20, 0x7F, 0x7F,
    ]);
}

#[test]
fn test_litlen_symbol_286_rejected() {
    // Fixed block emitting code 0xC6, which decodes to symbol 286.
    assert_invalid(&[0x1B, 0x03]);
}

#[test]
fn test_distance_code_30_rejected() {
    // Fixed block: literal 'a', length 3, then raw distance code 30.
    assert_invalid(&[0x4B, 0x04, 0x3E]);
}

#[test]
fn test_distance_beyond_history() {
    // Literal 'a', then a match at distance 2 with one byte of history.
    assert_invalid(&[0x4B, 0x04, 0x42, 0x00]);
}

#[test]
fn test_fresh_instance_after_error() {
    // Errors are fatal for the instance that raised them; callers recover
    // by constructing a new decoder.
    let mut inflater = Inflater::new();
    assert!(inflater.decompress_all(&[0x07]).is_err());

    let mut inflater = Inflater::new();
    assert_eq!(inflater.decompress_all(&[0x73, 0x04, 0x00]).unwrap(), b"A");
}
