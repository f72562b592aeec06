//! Out-of-core cache store backed by a chunk stream on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use simcache_core::{CacheError, CacheMode, Snapshot};
use tracing::{debug, info, warn};

use crate::reader::ChunkReader;
use crate::store::CacheStore;
use crate::writer::ChunkWriter;

/// The open file handle, if any. A store holds at most one.
enum Handle {
    Closed,
    Writing(ChunkWriter<BufWriter<File>>),
    Reading(ChunkReader<BufReader<File>>),
}

/// Writes and reads snapshots one chunk at a time.
///
/// Only the snapshot currently being appended or restored is resident.
/// Access is strictly sequential: there is no seeking and no way to
/// learn the total count short of reading to the terminator.
///
/// The file handle is opened by [`open`](CacheStore::open) and released
/// by [`finalize`](CacheStore::finalize). Dropping an unfinalized
/// recording store also closes the file, but without writing the
/// terminator; replaying such a file fails with
/// [`CacheError::CorruptCache`] once the last complete chunk is consumed.
///
/// # Examples
///
/// ```
/// use simcache_core::{CacheMode, Snapshot};
/// use simcache_store::{CacheStore, StreamingStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("run.stream");
///
/// let mut store = StreamingStore::new();
/// store.open(&path, CacheMode::Record).unwrap();
/// store.append(&Snapshot::from(vec![7, 7])).unwrap();
/// store.finalize().unwrap();
///
/// let mut replay = StreamingStore::new();
/// replay.open(&path, CacheMode::Replay).unwrap();
/// assert_eq!(replay.next_snapshot().unwrap().unwrap().as_bytes(), &[7, 7]);
/// assert!(replay.is_exhausted().unwrap());
/// ```
pub struct StreamingStore {
    location: Option<PathBuf>,
    mode: Option<CacheMode>,
    handle: Handle,
    written: u64,
    read: u64,
}

impl StreamingStore {
    /// An unopened store.
    pub fn new() -> Self {
        Self {
            location: None,
            mode: None,
            handle: Handle::Closed,
            written: 0,
            read: 0,
        }
    }

    /// `true` while a file handle is held.
    pub fn is_open(&self) -> bool {
        !matches!(self.handle, Handle::Closed)
    }

    /// The bound location, once opened.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn reader(&mut self, op: &str) -> Result<&mut ChunkReader<BufReader<File>>, CacheError> {
        let mode = self.mode;
        match &mut self.handle {
            Handle::Reading(reader) => Ok(reader),
            _ => Err(closed_error(mode, op)),
        }
    }
}

fn closed_error(mode: Option<CacheMode>, op: &str) -> CacheError {
    match mode {
        None => CacheError::invalid_state(format!("{op} called before the store was opened")),
        Some(mode) => {
            CacheError::invalid_state(format!("{op} is not available on this {mode} stream"))
        }
    }
}

impl Default for StreamingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for StreamingStore {
    fn open(&mut self, location: &Path, mode: CacheMode) -> Result<(), CacheError> {
        if self.mode.is_some() {
            return Err(CacheError::invalid_state("store is already open"));
        }
        self.handle = match mode {
            CacheMode::Record => {
                if location.exists() {
                    warn!(
                        path = %location.display(),
                        "cache stream already exists, deleting it"
                    );
                    fs::remove_file(location)?;
                }
                let file = File::create(location)?;
                Handle::Writing(ChunkWriter::new(BufWriter::new(file)))
            }
            CacheMode::Replay => match File::open(location) {
                Ok(file) => Handle::Reading(ChunkReader::new(BufReader::new(file))),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(CacheError::CacheUnavailable {
                        path: location.to_path_buf(),
                    })
                }
                Err(e) => return Err(CacheError::Io(e)),
            },
        };
        debug!(path = %location.display(), %mode, "opened cache stream");
        self.location = Some(location.to_path_buf());
        self.mode = Some(mode);
        Ok(())
    }

    fn append(&mut self, snapshot: &Snapshot) -> Result<(), CacheError> {
        let mode = self.mode;
        match &mut self.handle {
            Handle::Writing(writer) => writer.write_chunk(snapshot.as_bytes())?,
            _ => return Err(closed_error(mode, "append")),
        }
        self.written += 1;
        Ok(())
    }

    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, CacheError> {
        let chunk = self.reader("next_snapshot")?.next_chunk()?;
        match chunk {
            Some(bytes) => {
                self.read += 1;
                Ok(Some(Snapshot::new(bytes)))
            }
            None => {
                info!(chunks = self.read, "reached end of cache stream");
                Ok(None)
            }
        }
    }

    fn is_exhausted(&mut self) -> Result<bool, CacheError> {
        self.reader("is_exhausted")?.is_at_end()
    }

    fn finalize(&mut self) -> Result<(), CacheError> {
        if self.mode.is_none() {
            return Err(closed_error(None, "finalize"));
        }
        // The writer stays in place until the terminator is flushed, so a
        // failed finalize can be retried.
        if let Handle::Writing(writer) = &mut self.handle {
            writer.seal()?;
            info!(
                path = ?self.location,
                chunks = self.written,
                "wrote cache stream terminator"
            );
        }
        // Dropping the handle closes the file.
        self.handle = Handle::Closed;
        Ok(())
    }

    fn snapshots_written(&self) -> u64 {
        self.written
    }

    fn snapshots_read(&self) -> u64 {
        self.read
    }
}
