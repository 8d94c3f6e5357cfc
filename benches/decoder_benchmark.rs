//! Throughput of stream decoding
//!
//! Feeds a recorded-style reply through the frame decoder and the full
//! decode pipeline at several chunk sizes.
//! Run with: cargo bench

use bytes::Bytes;
use confab::sse::{decode_events, parse_frame, FrameDecoder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::executor::block_on;
use futures::stream::{self, StreamExt};

/// A reply of `chunks` ai_chunk frames bracketed by the usual framing events.
fn generate_stream(chunks: usize) -> String {
    let mut body = String::from(
        "data: {\"type\": \"user_message\", \"data\": {\"id\": 1, \"content\": \"hi\", \"sender\": \"user\", \"timestamp\": \"2024-05-01T10:00:00Z\"}}\n\n",
    );
    for i in 0..chunks {
        body.push_str(&format!(
            "data: {{\"type\": \"ai_chunk\", \"data\": \"token {} with some text \"}}\n\n",
            i
        ));
    }
    body.push_str("data: {\"type\": \"complete\"}\n\n");
    body
}

fn split(body: &str, chunk_size: usize) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(chunk_size)
        .map(Bytes::copy_from_slice)
        .collect()
}

fn bench_frame_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decoder");
    let body = generate_stream(500);
    group.throughput(Throughput::Bytes(body.len() as u64));

    for chunk_size in [16, 256, 4096] {
        let chunks = split(&body, chunk_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_byte_chunks", chunk_size)),
            &chunks,
            |b, chunks| {
                b.iter(|| {
                    let mut decoder = FrameDecoder::new();
                    let mut frames = 0;
                    for chunk in chunks {
                        frames += decoder.push(black_box(chunk)).len();
                    }
                    black_box(frames)
                });
            },
        );
    }

    group.finish();
}

fn bench_parse_frame(c: &mut Criterion) {
    let frame = "data: {\"type\": \"ai_chunk\", \"data\": \"token 42 with some text \"}";
    c.bench_function("parse_ai_chunk_frame", |b| {
        b.iter(|| parse_frame(black_box(frame)))
    });
}

fn bench_decode_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_events");

    for frames in [10, 100, 1000] {
        let body = generate_stream(frames);
        let chunks = split(&body, 512);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frames), &chunks, |b, chunks| {
            b.iter(|| {
                let source = stream::iter(chunks.iter().cloned().map(Ok::<_, std::io::Error>));
                let count = block_on(decode_events(source).count());
                black_box(count)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame_decoder, bench_parse_frame, bench_decode_pipeline);
criterion_main!(benches);
