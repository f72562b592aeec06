//! Benchmark profiles and utilities for simcache.
//!
//! - [`colony_profile`]: a collecting subject sized for codec benchmarks
//! - [`payloads`]: deterministic snapshot payloads for store benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use simcache_core::{Snapshot, Subject};
use simcache_test_utils::Colony;

/// A colony of `agents` agents that has already run `warmup` steps, so
/// its collector carries `warmup` entries of history.
pub fn colony_profile(agents: usize, warmup: u64) -> Colony {
    let mut colony = Colony::new(agents, u64::MAX);
    for _ in 0..warmup {
        // A fresh colony has a schedule, so stepping cannot fail.
        if colony.step().is_err() {
            break;
        }
    }
    colony
}

/// Generate `count` deterministic payloads of `size` bytes each.
///
/// Bytes come from a simple multiplicative hash of the seed so that
/// payloads are neither all-zero nor trivially compressible.
pub fn payloads(count: usize, size: usize, seed: u64) -> Vec<Snapshot> {
    (0..count)
        .map(|i| {
            let mut state = seed ^ (i as u64).wrapping_mul(1442695040888963407);
            let bytes = (0..size.max(1))
                .map(|_| {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    // Keep the alphabet small so compression has work to do.
                    (state >> 60) as u8
                })
                .collect();
            Snapshot::new(bytes)
        })
        .collect()
}
