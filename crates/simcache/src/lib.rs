//! simcache: record/replay caching for step-driven simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all simcache sub-crates. For most users, adding `simcache` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use simcache::prelude::*;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Walker { position: i64, running: bool }
//!
//! impl Subject for Walker {
//!     fn is_running(&self) -> bool { self.running }
//!     fn set_running(&mut self, running: bool) { self.running = running; }
//!     fn step(&mut self) -> Result<(), SubjectError> {
//!         self.position += 3;
//!         if self.position > 30 { self.running = false; }
//!         Ok(())
//!     }
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("walker.stream");
//!
//! let config = CacheConfig::record(&path).with_step_rate(StepRate::new(2).unwrap());
//! let mut record = CacheController::streaming(Walker { position: 0, running: true }, config).unwrap();
//! record.run_model().unwrap();
//! assert_eq!(record.step_count(), 11);
//!
//! let blank = Walker { position: -1, running: true };
//! let mut replay = CacheController::streaming(blank, CacheConfig::replay(&path)).unwrap();
//! replay.run_model().unwrap();
//! assert_eq!(replay.step_count(), 11 / 2);
//! assert_eq!(replay.subject().position, 30);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `simcache-core` | `Subject`, `CacheMode`, `Snapshot`, errors |
//! | [`codec`] | `simcache-codec` | Snapshot codecs, strip policies, `DataCollector` |
//! | [`store`] | `simcache-store` | Memory and streaming stores, chunk framing, compressors |
//! | [`engine`] | `simcache-engine` | `CacheController`, `CacheConfig`, run driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`simcache-core`).
///
/// Contains the [`types::Subject`] contract, [`types::CacheMode`], the
/// opaque [`types::Snapshot`] payload, and the error enums.
pub use simcache_core as types;

/// Snapshot capture and restore (`simcache-codec`).
///
/// [`codec::FullStateCodec`] serializes the whole subject;
/// [`codec::StrippedCodec`] drops what replay does not need first.
pub use simcache_codec as codec;

/// Cache stores (`simcache-store`).
///
/// [`store::MemoryStore`] writes one compressed artifact per run;
/// [`store::StreamingStore`] writes one chunk per snapshot.
pub use simcache_store as store;

/// The record/replay controller (`simcache-engine`).
pub use simcache_engine as engine;

/// Common imports for typical simcache usage.
///
/// ```rust
/// use simcache::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use simcache_core::{CacheMode, Snapshot, Subject};

    // Errors
    pub use simcache_core::{CacheError, SubjectError};

    // Codecs
    pub use simcache_codec::{
        DataCollector, FullStateCodec, SnapshotCodec, StripPolicy, Strippable, StrippedCodec,
    };

    // Stores
    pub use simcache_store::{CacheStore, MemoryStore, StreamingStore};

    // Engine
    pub use simcache_engine::{CacheConfig, CacheController, RunUntilOutcome, StepRate};
}
