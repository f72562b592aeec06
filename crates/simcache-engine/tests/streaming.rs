//! Integration tests: the chunk-stream cache on disk.
//!
//! Covers the end-of-stream framing, equivalence with the in-memory
//! store, and what happens to streams that were cut short.

use std::fs::{self, OpenOptions};
use std::path::Path;

use simcache_codec::FullStateCodec;
use simcache_core::{CacheError, CacheMode, Snapshot};
use simcache_engine::{CacheConfig, CacheController, StepRate};
use simcache_store::{scan_chunks, CacheStore, MemoryStore, StreamingStore};
use simcache_test_utils::{Fibonacci, ReplayOnly};
use tempfile::TempDir;

fn read_all<T: CacheStore>(mut store: T, path: &Path) -> Vec<Snapshot> {
    store.open(path, CacheMode::Replay).unwrap();
    let mut out = Vec::new();
    while let Some(snap) = store.next_snapshot().unwrap() {
        out.push(snap);
    }
    store.finalize().unwrap();
    out
}

#[test]
fn stream_has_one_frame_per_snapshot_then_terminator() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.stream");
    let cfg = CacheConfig::record(&path).with_step_rate(StepRate::new(2).unwrap());
    let mut rec = CacheController::streaming(Fibonacci::new(), cfg).unwrap();
    for _ in 0..11 {
        rec.step().unwrap();
    }
    rec.finish().unwrap();

    let bytes = fs::read(&path).unwrap();
    let scan = scan_chunks(&mut bytes.as_slice()).unwrap();
    assert_eq!(scan.chunk_count(), 11 / 2 + 1);
    assert!(scan.terminated);
    assert_eq!(scan.trailing_bytes, 0);
    assert!(scan.chunk_lengths.iter().all(|&len| len > 0));
    assert_eq!(rec.store().snapshots_written(), 6);
}

#[test]
fn memory_and_streaming_stores_agree() {
    let dir = TempDir::new().unwrap();
    let memory_path = dir.path().join("run.cache");
    let stream_path = dir.path().join("run.stream");

    let mut a = CacheController::in_memory(Fibonacci::new(), CacheConfig::record(&memory_path)).unwrap();
    a.run_model().unwrap();
    let mut b = CacheController::streaming(Fibonacci::new(), CacheConfig::record(&stream_path)).unwrap();
    b.run_model().unwrap();

    let from_memory = read_all(MemoryStore::new(), &memory_path);
    let from_stream = read_all(StreamingStore::new(), &stream_path);
    assert_eq!(from_memory.len() as u64, Fibonacci::STEPS_TO_LIMIT + 1);
    assert_eq!(from_memory, from_stream);
    assert_eq!(from_memory, a.store().snapshots());
}

#[test]
fn truncated_stream_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.stream");
    let mut rec = CacheController::streaming(Fibonacci::new(), CacheConfig::record(&path)).unwrap();
    for _ in 0..5 {
        rec.step().unwrap();
    }
    rec.finish().unwrap();

    // Cut into the terminator and the end of the last chunk.
    let len = fs::metadata(&path).unwrap().len();
    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(len - 11).unwrap();
    drop(file);

    let result = CacheController::streaming(ReplayOnly::fibonacci(), CacheConfig::replay(&path))
        .and_then(|mut rep| rep.run_model());
    match result {
        Err(CacheError::CorruptCache { .. }) => {}
        other => panic!("expected CorruptCache, got {other:?}"),
    }
}

#[test]
fn abandoned_recording_lacks_terminator() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.stream");
    {
        let mut rec =
            CacheController::streaming(Fibonacci::new(), CacheConfig::record(&path)).unwrap();
        for _ in 0..3 {
            rec.step().unwrap();
        }
        // Dropped without finish.
    }

    let bytes = fs::read(&path).unwrap();
    let scan = scan_chunks(&mut bytes.as_slice()).unwrap();
    assert_eq!(scan.chunk_count(), 4);
    assert!(!scan.terminated);

    let mut rep = CacheController::new(
        ReplayOnly::fibonacci(),
        CacheConfig::replay(&path),
        FullStateCodec,
        StreamingStore::new(),
    )
    .unwrap();
    rep.step().unwrap();
    rep.step().unwrap();
    // The last chunk restores, then the lookahead finds no terminator.
    assert!(matches!(rep.step(), Err(CacheError::CorruptCache { .. })));
    assert_eq!(rep.subject().inner.current, 3);
}

#[test]
fn recording_replaces_a_previous_stream() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.stream");

    let mut long = CacheController::streaming(Fibonacci::new(), CacheConfig::record(&path)).unwrap();
    long.run_model().unwrap();
    let long_len = fs::metadata(&path).unwrap().len();

    let mut short = CacheController::streaming(Fibonacci::new(), CacheConfig::record(&path)).unwrap();
    short.step().unwrap();
    short.finish().unwrap();
    assert!(fs::metadata(&path).unwrap().len() < long_len);

    let mut rep = CacheController::streaming(ReplayOnly::fibonacci(), CacheConfig::replay(&path)).unwrap();
    rep.run_model().unwrap();
    assert_eq!(rep.step_count(), 1);
}
