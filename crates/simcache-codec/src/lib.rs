//! Snapshot capture and restore for simcache.
//!
//! A [`SnapshotCodec`] turns a subject into an opaque [`Snapshot`] and
//! back. The codec is chosen independently of where snapshots are
//! stored, which makes it the main lever on cache size:
//!
//! - [`FullStateCodec`] serializes the entire subject.
//! - [`StrippedCodec`] serializes a copy narrowed by the subject's own
//!   [`StripPolicy`] (no scheduler, truncated [`DataCollector`] history).
//! - Anything else implements [`SnapshotCodec`] directly, e.g. a codec
//!   that keeps a single scalar that is sufficient for replay.
//!
//! [`Snapshot`]: simcache_core::Snapshot

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod history;
pub mod strip;

pub use codec::{FullStateCodec, SnapshotCodec};
pub use history::{AgentRecord, DataCollector};
pub use strip::{HistoryRetention, StripPolicy, Strippable, StrippedCodec};
