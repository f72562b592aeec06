//! The record/replay operating mode.

use std::fmt;

/// Which way a cache controller runs. Chosen once at construction.
///
/// # Examples
///
/// ```
/// use simcache_core::CacheMode;
///
/// assert!(CacheMode::Record.is_record());
/// assert_eq!(CacheMode::Replay.to_string(), "replay");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheMode {
    /// Simulate every step and capture snapshots into the cache.
    Record,
    /// Restore every step from the cache; never simulate.
    Replay,
}

impl CacheMode {
    /// `true` for [`CacheMode::Record`].
    pub fn is_record(self) -> bool {
        matches!(self, Self::Record)
    }

    /// `true` for [`CacheMode::Replay`].
    pub fn is_replay(self) -> bool {
        matches!(self, Self::Replay)
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => write!(f, "record"),
            Self::Replay => write!(f, "replay"),
        }
    }
}
