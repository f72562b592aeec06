//! Snapshot cache stores for simcache.
//!
//! A cache is an ordered sequence of opaque [`Snapshot`]s. Two stores
//! share the [`CacheStore`] contract and are observably equivalent at
//! the end of a full read:
//!
//! - [`MemoryStore`] keeps every snapshot resident and persists the
//!   whole sequence as one compressed artifact when the run finishes.
//! - [`StreamingStore`] writes and reads one length-prefixed chunk at a
//!   time through [`ChunkWriter`] / [`ChunkReader`], so memory use stays
//!   bounded by the largest single snapshot.
//!
//! # Formats
//!
//! Whole-cache artifact ([`MemoryStore`]):
//!
//! ```text
//! [MAGIC "SMCH"] [FORMAT_VERSION u8] [compressor tag u8] [compressed payload]
//! ```
//!
//! The payload decompresses to the bitcode encoding of the snapshot
//! byte-strings in capture order.
//!
//! Chunk stream ([`StreamingStore`]), no header:
//!
//! ```text
//! [u64 LE len][len bytes] [u64 LE len][len bytes] ... [u64 LE 0]
//! ```
//!
//! [`Snapshot`]: simcache_core::Snapshot

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compress;
pub mod frame;
pub mod memory;
pub mod reader;
pub mod store;
pub mod streaming;
pub mod writer;

pub use compress::{Compressor, DeflateCompressor, Lz4Compressor};
pub use frame::{scan_chunks, ChunkScan};
pub use memory::MemoryStore;
pub use reader::{ChunkIter, ChunkReader};
pub use store::CacheStore;
pub use streaming::StreamingStore;
pub use writer::ChunkWriter;

/// Magic bytes at the start of every whole-cache artifact.
pub const MAGIC: [u8; 4] = *b"SMCH";

/// Current whole-cache artifact format version.
pub const FORMAT_VERSION: u8 = 1;
