//! Opaque serialized subject state.

use std::fmt;

/// One captured point-in-time state of a subject, as raw bytes.
///
/// Snapshots are write-once: there is no mutable access to the payload.
/// The caching core never looks inside; only the codec that produced a
/// snapshot knows how to restore from it.
///
/// # Examples
///
/// ```
/// use simcache_core::Snapshot;
///
/// let snap = Snapshot::from(vec![1, 2, 3]);
/// assert_eq!(snap.len(), 3);
/// assert_eq!(snap.as_bytes(), &[1, 2, 3]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    /// Wrap an owned byte buffer.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The serialized payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the snapshot and return the underlying buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Snapshot {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Snapshot {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Payloads can be large; print the size rather than the bytes.
impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} bytes)", self.0.len())
    }
}
