//! Error types for the simcache record/replay layer.
//!
//! Organized by origin: [`CacheError`] covers everything the caching
//! core itself can report, and [`SubjectError`] is what a wrapped
//! subject returns from its own step logic.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised by a subject's own step logic.
///
/// The caching core never inspects, retries, or rewrites these. They are
/// carried to the caller unchanged inside [`CacheError::SubjectFailed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubjectError {
    /// The subject's step function failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A subject-defined constraint was violated.
    ConstraintViolation {
        /// Description of the violated constraint.
        constraint: String,
    },
}

impl fmt::Display for SubjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::ConstraintViolation { constraint } => {
                write!(f, "constraint violation: {constraint}")
            }
        }
    }
}

impl Error for SubjectError {}

/// Errors that can occur while recording, replaying, or finalizing a cache.
#[derive(Debug)]
pub enum CacheError {
    /// The cache location does not exist when opening it for replay.
    CacheUnavailable {
        /// The location that was requested.
        path: PathBuf,
    },
    /// The cache exists but its content cannot be decoded into the
    /// expected shape.
    CorruptCache {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// An operation was requested in a state that does not permit it.
    InvalidState {
        /// Description of the violated precondition.
        reason: String,
    },
    /// A codec could not encode the subject's state into a snapshot.
    EncodingFailed {
        /// What the encoder reported.
        detail: String,
    },
    /// A codec produced a zero-length snapshot.
    ///
    /// Zero length is reserved for the streaming end-of-cache terminator,
    /// so no store accepts an empty snapshot.
    EmptySnapshot,
    /// The cache configuration failed validation.
    InvalidConfig {
        /// Description of the validation failure.
        reason: String,
    },
    /// The wrapped subject's step logic failed.
    SubjectFailed(SubjectError),
    /// An I/O error occurred while reading or writing the cache.
    Io(io::Error),
}

impl CacheError {
    /// Shorthand for a [`CacheError::CorruptCache`] with the given detail.
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Self::CorruptCache {
            detail: detail.into(),
        }
    }

    /// Shorthand for a [`CacheError::InvalidState`] with the given reason.
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheUnavailable { path } => {
                write!(f, "cache unavailable: {} does not exist", path.display())
            }
            Self::CorruptCache { detail } => write!(f, "corrupt cache: {detail}"),
            Self::InvalidState { reason } => write!(f, "invalid state: {reason}"),
            Self::EncodingFailed { detail } => write!(f, "snapshot encoding failed: {detail}"),
            Self::EmptySnapshot => write!(f, "codec produced an empty snapshot"),
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
            Self::SubjectFailed(e) => write!(f, "subject step failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubjectFailed(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CacheError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<SubjectError> for CacheError {
    fn from(e: SubjectError) -> Self {
        Self::SubjectFailed(e)
    }
}
