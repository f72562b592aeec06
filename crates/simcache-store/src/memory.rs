//! Fully resident cache store persisted as a single compressed artifact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use simcache_core::{CacheError, CacheMode, Snapshot};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::compress::{Compressor, Lz4Compressor};
use crate::store::CacheStore;
use crate::{FORMAT_VERSION, MAGIC};

/// Header length: magic, format version, compressor tag.
const HEADER_LEN: usize = MAGIC.len() + 2;

/// Holds every snapshot in memory for the whole run.
///
/// In record mode nothing touches the disk until
/// [`finalize`](CacheStore::finalize), which writes the whole sequence
/// in one go. In replay mode [`open`](CacheStore::open) loads and decodes
/// the entire artifact before the first snapshot is handed out, and the
/// sequence stays addressable by index through [`get`](MemoryStore::get).
///
/// # Examples
///
/// ```
/// use simcache_core::{CacheMode, Snapshot};
/// use simcache_store::{CacheStore, MemoryStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("run.cache");
///
/// let mut store = MemoryStore::new();
/// store.open(&path, CacheMode::Record).unwrap();
/// store.append(&Snapshot::from(vec![1])).unwrap();
/// store.append(&Snapshot::from(vec![2])).unwrap();
/// store.finalize().unwrap();
///
/// let mut replay = MemoryStore::new();
/// replay.open(&path, CacheMode::Replay).unwrap();
/// assert_eq!(replay.len(), 2);
/// assert_eq!(replay.get(1).unwrap().as_bytes(), &[2]);
/// ```
pub struct MemoryStore<C: Compressor = Lz4Compressor> {
    compressor: C,
    location: Option<PathBuf>,
    mode: Option<CacheMode>,
    snapshots: Vec<Snapshot>,
    cursor: usize,
    persisted: bool,
}

impl MemoryStore<Lz4Compressor> {
    /// An LZ4-compressed store.
    pub fn new() -> Self {
        Self::with_compressor(Lz4Compressor)
    }
}

impl Default for MemoryStore<Lz4Compressor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Compressor> MemoryStore<C> {
    /// A store that compresses its artifact with `compressor`.
    pub fn with_compressor(compressor: C) -> Self {
        Self {
            compressor,
            location: None,
            mode: None,
            snapshots: Vec::new(),
            cursor: 0,
            persisted: false,
        }
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// `true` if no snapshot is held.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The snapshot at `index` in capture order.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// All held snapshots in capture order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// The compressor this store was built with.
    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    fn require_mode(&self, wanted: CacheMode, op: &str) -> Result<(), CacheError> {
        match self.mode {
            Some(mode) if mode == wanted => Ok(()),
            Some(mode) => Err(CacheError::invalid_state(format!(
                "{op} is not available in {mode} mode"
            ))),
            None => Err(CacheError::invalid_state(format!(
                "{op} called before the store was opened"
            ))),
        }
    }

    fn encode_artifact(&self) -> Result<Vec<u8>, CacheError> {
        let raw: Vec<Vec<u8>> = self
            .snapshots
            .iter()
            .map(|s| s.as_bytes().to_vec())
            .collect();
        let packed = self.compressor.compress(&bitcode::encode(&raw))?;

        let mut out = Vec::with_capacity(HEADER_LEN + packed.len());
        out.extend_from_slice(&MAGIC);
        out.push(FORMAT_VERSION);
        out.push(self.compressor.tag());
        out.extend_from_slice(&packed);
        Ok(out)
    }

    fn decode_artifact(&self, bytes: &[u8]) -> Result<Vec<Snapshot>, CacheError> {
        if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
            return Err(CacheError::corrupt("missing cache header magic"));
        }
        let version = bytes[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(CacheError::corrupt(format!(
                "unsupported cache format version {version}"
            )));
        }
        let tag = bytes[MAGIC.len() + 1];
        if tag != self.compressor.tag() {
            return Err(CacheError::corrupt(format!(
                "cache was compressed with tag {tag}, store expects {} ({})",
                self.compressor.tag(),
                self.compressor.name()
            )));
        }

        let raw = self.compressor.decompress(&bytes[HEADER_LEN..])?;
        let decoded: Vec<Vec<u8>> = bitcode::decode(&raw)
            .map_err(|e| CacheError::corrupt(format!("snapshot sequence: {e}")))?;
        if decoded.iter().any(Vec::is_empty) {
            return Err(CacheError::corrupt("cache contains an empty snapshot"));
        }
        Ok(decoded.into_iter().map(Snapshot::new).collect())
    }
}

impl<C: Compressor> CacheStore for MemoryStore<C> {
    fn open(&mut self, location: &Path, mode: CacheMode) -> Result<(), CacheError> {
        if self.mode.is_some() {
            return Err(CacheError::invalid_state("store is already open"));
        }
        self.snapshots.clear();
        self.cursor = 0;
        self.persisted = false;

        if mode.is_replay() {
            let bytes = match fs::read(location) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(CacheError::CacheUnavailable {
                        path: location.to_path_buf(),
                    })
                }
                Err(e) => return Err(CacheError::Io(e)),
            };
            self.snapshots = self.decode_artifact(&bytes)?;
            debug!(
                path = %location.display(),
                snapshots = self.snapshots.len(),
                "loaded cache into memory"
            );
        }

        self.location = Some(location.to_path_buf());
        self.mode = Some(mode);
        Ok(())
    }

    fn append(&mut self, snapshot: &Snapshot) -> Result<(), CacheError> {
        self.require_mode(CacheMode::Record, "append")?;
        if self.persisted {
            return Err(CacheError::invalid_state("append after finalize"));
        }
        if snapshot.is_empty() {
            return Err(CacheError::EmptySnapshot);
        }
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, CacheError> {
        self.require_mode(CacheMode::Replay, "next_snapshot")?;
        let next = self.snapshots.get(self.cursor).cloned();
        if next.is_some() {
            self.cursor += 1;
        }
        Ok(next)
    }

    fn is_exhausted(&mut self) -> Result<bool, CacheError> {
        self.require_mode(CacheMode::Replay, "is_exhausted")?;
        Ok(self.cursor >= self.snapshots.len())
    }

    fn finalize(&mut self) -> Result<(), CacheError> {
        let Some(mode) = self.mode else {
            return Err(CacheError::invalid_state(
                "finalize called before the store was opened",
            ));
        };
        if mode.is_replay() || self.persisted {
            return Ok(());
        }
        let Some(location) = self.location.clone() else {
            return Err(CacheError::invalid_state("store has no location"));
        };

        let artifact = self.encode_artifact()?;
        atomic_write(&location, &artifact)?;
        self.persisted = true;
        info!(
            path = %location.display(),
            snapshots = self.snapshots.len(),
            bytes = artifact.len(),
            compressor = self.compressor.name(),
            "wrote cache file"
        );
        Ok(())
    }

    fn snapshots_written(&self) -> u64 {
        match self.mode {
            Some(CacheMode::Record) => self.snapshots.len() as u64,
            _ => 0,
        }
    }

    fn snapshots_read(&self) -> u64 {
        self.cursor as u64
    }
}

/// Write `data` to `path` through a temp file in the same directory and a
/// rename, so an interrupted write never leaves a half-written cache at
/// `path`. The temp file is removed if any step fails.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CacheError::Io(e.error))?;
    Ok(())
}
