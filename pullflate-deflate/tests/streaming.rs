//! Suspend/resume behaviour under adversarial chunking.
//!
//! The decoder must produce the identical byte sequence for every
//! partitioning of the input into chunks and of the output into refills,
//! and its status returns must uphold their post-conditions: NeedsInput
//! only with the input fully consumed, NeedsOutput only with the output
//! completely full.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use pullflate_core::{Decompressor, InflateStatus};
use pullflate_deflate::{Inflater, ZlibDecoder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

fn deflate_with(data: &[u8], level: Compression) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), level);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Drive an `Inflater` with fixed input/output chunk sizes, checking the
/// status post-conditions on every call.
fn decode_chunked(compressed: &[u8], in_chunk: usize, out_chunk: usize) -> Vec<u8> {
    let mut inflater = Inflater::new();
    let mut output = Vec::new();
    let mut out = vec![0u8; out_chunk];
    let mut pos = 0;

    loop {
        let end = (pos + in_chunk).min(compressed.len());
        let (consumed, produced, status) = inflater.decompress(&compressed[pos..end], &mut out).unwrap();
        pos += consumed;
        output.extend_from_slice(&out[..produced]);

        match status {
            InflateStatus::Done => break,
            InflateStatus::NeedsInput => {
                assert_eq!(pos, end, "NeedsInput must leave the chunk fully consumed");
                assert!(pos < compressed.len(), "stream ended prematurely");
            }
            InflateStatus::NeedsOutput => {
                assert_eq!(produced, out_chunk, "NeedsOutput must leave the sink full");
            }
        }
    }
    output
}

#[test]
fn test_chunking_invariance_handcrafted() {
    // A fixed-Huffman block: literals a b c, then a length-3 distance-3
    // match; decodes to "abcabc".
    let compressed = [0x4B, 0x4C, 0x4A, 0x06, 0x22, 0x00];
    for in_chunk in 1..=compressed.len() {
        for out_chunk in 1..=8 {
            assert_eq!(
                decode_chunked(&compressed, in_chunk, out_chunk),
                b"abcabc",
                "in_chunk={in_chunk} out_chunk={out_chunk}",
            );
        }
    }
}

#[test]
fn test_chunking_invariance_all_block_types() {
    let data: Vec<u8> = {
        // Compressible front, noisy tail: encoders mix block types.
        let mut data = b"abcdefgh".repeat(2_000);
        let mut seed = 7u32;
        for _ in 0..16_000 {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            data.push((seed >> 16) as u8);
        }
        data
    };

    for level in [Compression::none(), Compression::fast(), Compression::best()] {
        let compressed = deflate_with(&data, level);
        let whole = decode_chunked(&compressed, compressed.len(), 64 * 1024);
        assert_eq!(whole, data);

        for (in_chunk, out_chunk) in [(1, 64 * 1024), (compressed.len(), 1), (7, 23), (997, 333)] {
            assert_eq!(
                decode_chunked(&compressed, in_chunk, out_chunk),
                data,
                "level={level:?} in_chunk={in_chunk} out_chunk={out_chunk}",
            );
        }
    }
}

#[test]
fn test_random_chunk_partitions() {
    let data = b"the quick brown fox jumps over the lazy dog ".repeat(800);
    let compressed = deflate_with(&data, Compression::best());
    let mut rng = StdRng::seed_from_u64(0xDEFA);

    for _ in 0..20 {
        let mut inflater = Inflater::new();
        let mut output = Vec::new();
        let mut pos = 0;

        loop {
            let in_chunk = rng.gen_range(1..=257);
            let out_chunk = rng.gen_range(1..=1024);
            let end = (pos + in_chunk).min(compressed.len());
            let mut out = vec![0u8; out_chunk];

            let (consumed, produced, status) =
                inflater.decompress(&compressed[pos..end], &mut out).unwrap();
            pos += consumed;
            output.extend_from_slice(&out[..produced]);
            if status == InflateStatus::Done {
                break;
            }
        }
        assert_eq!(output, data);
    }
}

#[test]
fn test_zlib_streaming_with_refill_loop() {
    // Drive the zlib decoder the way an I/O loop would: append unconsumed
    // bytes to the next chunk, drain the output every call.
    let data = b"streaming refill loop ".repeat(3_000);
    let compressed = {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).unwrap();
        encoder.finish().unwrap()
    };

    let mut rng = StdRng::seed_from_u64(0x515B);
    for _ in 0..10 {
        let mut decoder = ZlibDecoder::new();
        let mut output = Vec::new();
        let mut pending: Vec<u8> = Vec::new();
        let mut fed = 0;
        let mut out = vec![0u8; 509];
        let mut done = false;

        while !done {
            if fed < compressed.len() {
                let take = rng.gen_range(1..=64).min(compressed.len() - fed);
                pending.extend_from_slice(&compressed[fed..fed + take]);
                fed += take;
            }
            loop {
                let (consumed, produced, status) = decoder.decompress(&pending, &mut out).unwrap();
                pending.drain(..consumed);
                output.extend_from_slice(&out[..produced]);
                match status {
                    InflateStatus::NeedsOutput => continue,
                    InflateStatus::Done => {
                        done = true;
                        break;
                    }
                    InflateStatus::NeedsInput => break,
                }
            }
        }

        assert_eq!(output, data);
        assert!(pending.is_empty());
        assert!(decoder.is_finished());
    }
}

#[test]
fn test_output_starved_one_byte_at_a_time() {
    // An output sink of one byte forces a drain yield per produced byte.
    let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_vec();
    let compressed = deflate_with(&data, Compression::fast());
    assert_eq!(decode_chunked(&compressed, compressed.len(), 1), data);
}

#[test]
fn test_arbitrary_bytes_never_panic_and_always_terminate() {
    let mut rng = StdRng::seed_from_u64(97);

    for _ in 0..300 {
        let len = rng.gen_range(0..512);
        let garbage: Vec<u8> = (0..len).map(|_| rng.gen::<u8>()).collect();

        let mut inflater = Inflater::new();
        let mut out = [0u8; 256];
        let mut pos = 0;
        loop {
            match inflater.decompress(&garbage[pos..], &mut out) {
                Ok((consumed, _, status)) => {
                    pos += consumed;
                    match status {
                        InflateStatus::Done => break,
                        InflateStatus::NeedsInput if pos >= garbage.len() => break,
                        InflateStatus::NeedsInput | InflateStatus::NeedsOutput => {}
                    }
                }
                Err(_) => break,
            }
        }
    }
}
