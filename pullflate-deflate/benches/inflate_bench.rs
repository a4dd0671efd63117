//! Decompression throughput benchmarks.
//!
//! Measures the streaming decoder over data patterns that steer the
//! reference compressor toward different block mixes: stored blocks for
//! random data, dense back-references for repetitive data, dynamic Huffman
//! for text.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use flate2::Compression;
use flate2::write::{DeflateEncoder, ZlibEncoder};
use pullflate_core::Decompressor;
use pullflate_deflate::{Inflater, ZlibDecoder};
use std::hint::black_box;
use std::io::Write;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Random data - no patterns (stored blocks)
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Repetitive pattern - dense back-references
    pub fn repetitive(size: usize) -> Vec<u8> {
        let pattern = b"TOBEORNOTTOBEORTOBEORNOT";
        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let remaining = size - data.len();
            data.extend_from_slice(&pattern[..remaining.min(pattern.len())]);
        }
        data
    }

    /// Text-like data - realistic dynamic Huffman blocks
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! ";
        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let remaining = size - data.len();
            data.extend_from_slice(&text[..remaining.min(text.len())]);
        }
        data
    }
}

fn compress_raw(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn bench_inflate(c: &mut Criterion) {
    let patterns: [(&str, fn(usize) -> Vec<u8>); 3] = [
        ("random", test_data::random),
        ("repetitive", test_data::repetitive),
        ("text", test_data::text_like),
    ];

    let mut group = c.benchmark_group("inflate");
    for (name, generate) in patterns {
        for size in [16 * 1024, 256 * 1024] {
            let data = generate(size);
            let compressed = compress_raw(&data);

            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(name, size),
                &compressed,
                |b, compressed| {
                    let mut inflater = Inflater::new();
                    let mut out = vec![0u8; 64 * 1024];
                    b.iter(|| {
                        inflater.reset();
                        let mut pos = 0;
                        loop {
                            let (consumed, produced, status) = inflater
                                .decompress(&compressed[pos..], &mut out)
                                .expect("valid stream");
                            pos += consumed;
                            black_box(&out[..produced]);
                            if status == pullflate_core::InflateStatus::Done {
                                break;
                            }
                        }
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_zlib(c: &mut Criterion) {
    let data = test_data::text_like(256 * 1024);
    let compressed = {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).unwrap();
        encoder.finish().unwrap()
    };

    let mut group = c.benchmark_group("zlib");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut decoder = ZlibDecoder::new();
            black_box(decoder.decompress_all(black_box(&compressed)).unwrap())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_inflate, bench_zlib);
criterion_main!(benches);
