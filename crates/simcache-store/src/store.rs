//! The contract shared by every cache store.

use std::path::Path;

use simcache_core::{CacheError, CacheMode, Snapshot};

/// An ordered sequence of snapshots backed by exactly one location.
///
/// A store is built unopened with its own options, then opened once by
/// the controller for either writing ([`CacheMode::Record`]) or reading
/// ([`CacheMode::Replay`]), never both. Calling a record-only operation
/// on a replay store (or the reverse), or any operation before
/// [`open`](CacheStore::open), returns [`CacheError::InvalidState`].
pub trait CacheStore {
    /// Bind the store to `location` in the given mode.
    ///
    /// Replay fails with [`CacheError::CacheUnavailable`] if `location`
    /// does not exist, and with [`CacheError::CorruptCache`] if a store
    /// that loads eagerly finds content it cannot decode.
    fn open(&mut self, location: &Path, mode: CacheMode) -> Result<(), CacheError>;

    /// Append the next snapshot. Record mode only.
    ///
    /// Returns [`CacheError::EmptySnapshot`] for a zero-length payload.
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), CacheError>;

    /// Take the next snapshot in capture order, or `None` once the cache
    /// is exhausted. Replay mode only.
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, CacheError>;

    /// `true` if no snapshot remains to be read. Replay mode only.
    ///
    /// Never consumes a snapshot; a streaming store may decode the next
    /// length prefix to answer.
    fn is_exhausted(&mut self) -> Result<bool, CacheError>;

    /// Make the cache durable (record) and release any open handle.
    fn finalize(&mut self) -> Result<(), CacheError>;

    /// Number of snapshots appended so far.
    fn snapshots_written(&self) -> u64;

    /// Number of snapshots handed out by [`next_snapshot`](CacheStore::next_snapshot).
    fn snapshots_read(&self) -> u64;
}
