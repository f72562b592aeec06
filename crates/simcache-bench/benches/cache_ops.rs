//! Criterion micro-benchmarks for snapshot capture, cache stores, and
//! a full record/replay round.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use simcache_bench::{colony_profile, payloads};
use simcache_codec::{FullStateCodec, SnapshotCodec, StrippedCodec};
use simcache_core::CacheMode;
use simcache_engine::{CacheConfig, CacheController};
use simcache_store::{CacheStore, DeflateCompressor, MemoryStore, StreamingStore};
use simcache_test_utils::{Fibonacci, ReplayOnly};

/// Benchmark: full-state vs stripped capture of a colony with history.
fn bench_capture_colony(c: &mut Criterion) {
    let colony = colony_profile(256, 200);

    c.bench_function("capture_full_state_colony", |b| {
        b.iter(|| black_box(FullStateCodec.capture(&colony).unwrap()));
    });
    c.bench_function("capture_stripped_colony", |b| {
        b.iter(|| black_box(StrippedCodec::new().capture(&colony).unwrap()));
    });
}

/// Benchmark: append 256 x 1 KiB snapshots and write the artifact.
fn bench_memory_store_finalize(c: &mut Criterion) {
    let snaps = payloads(256, 1024, 42);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.cache");

    c.bench_function("memory_store_lz4_256x1k", |b| {
        b.iter(|| {
            let mut store = MemoryStore::new();
            store.open(&path, CacheMode::Record).unwrap();
            for s in &snaps {
                store.append(s).unwrap();
            }
            store.finalize().unwrap();
        });
    });
    c.bench_function("memory_store_deflate_256x1k", |b| {
        b.iter(|| {
            let mut store = MemoryStore::with_compressor(DeflateCompressor::default());
            store.open(&path, CacheMode::Record).unwrap();
            for s in &snaps {
                store.append(s).unwrap();
            }
            store.finalize().unwrap();
        });
    });
}

/// Benchmark: write then read back 256 x 1 KiB chunks.
fn bench_streaming_store(c: &mut Criterion) {
    let snaps = payloads(256, 1024, 7);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.stream");

    c.bench_function("streaming_store_write_256x1k", |b| {
        b.iter(|| {
            let mut store = StreamingStore::new();
            store.open(&path, CacheMode::Record).unwrap();
            for s in &snaps {
                store.append(s).unwrap();
            }
            store.finalize().unwrap();
        });
    });

    c.bench_function("streaming_store_read_256x1k", |b| {
        b.iter(|| {
            let mut store = StreamingStore::new();
            store.open(&path, CacheMode::Replay).unwrap();
            while let Some(s) = store.next_snapshot().unwrap() {
                black_box(&s);
            }
            store.finalize().unwrap();
        });
    });
}

/// Benchmark: record a Fibonacci run to completion, then replay it.
fn bench_record_replay_round(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fib.cache");

    c.bench_function("record_replay_fibonacci", |b| {
        b.iter(|| {
            let mut rec =
                CacheController::in_memory(Fibonacci::new(), CacheConfig::record(&path)).unwrap();
            rec.run_model().unwrap();
            let mut rep =
                CacheController::in_memory(ReplayOnly::fibonacci(), CacheConfig::replay(&path))
                    .unwrap();
            rep.run_model().unwrap();
            black_box(rep.subject().inner.current);
        });
    });
}

criterion_group!(
    benches,
    bench_capture_colony,
    bench_memory_store_finalize,
    bench_streaming_store,
    bench_record_replay_round
);
criterion_main!(benches);
