//! Cache configuration, validation, and error types.
//!
//! [`CacheConfig`] is the builder-input for constructing a
//! [`CacheController`](crate::CacheController).
//! [`validate()`](CacheConfig::validate) checks structural invariants
//! before the store is opened.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use simcache_core::{CacheError, CacheMode};

// ── StepRate ───────────────────────────────────────────────────────

/// Capture interval in steps. Always at least 1.
///
/// With rate `r`, recording captures a snapshot whenever the step count
/// is a multiple of `r`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StepRate(u64);

impl StepRate {
    /// Capture on every step.
    pub const EVERY_STEP: Self = Self(1);

    /// Build a rate, rejecting zero.
    pub fn new(rate: u64) -> Result<Self, ConfigError> {
        if rate == 0 {
            return Err(ConfigError::ZeroStepRate);
        }
        Ok(Self(rate))
    }

    /// The interval in steps.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Whether a snapshot is captured once `step_count` steps have run.
    pub fn is_capture_step(self, step_count: u64) -> bool {
        step_count % self.0 == 0
    }

    /// Snapshots stored after recording `steps` steps, including the
    /// initial one.
    pub fn snapshots_for(self, steps: u64) -> u64 {
        steps / self.0 + 1
    }
}

impl Default for StepRate {
    fn default() -> Self {
        Self::EVERY_STEP
    }
}

impl fmt::Display for StepRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`CacheConfig::validate()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A step rate of zero was requested.
    ZeroStepRate,
    /// The cache location is the empty path.
    EmptyLocation,
    /// The cache location names an existing directory.
    LocationIsDirectory {
        /// The offending location.
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStepRate => write!(f, "step_rate must be at least 1"),
            Self::EmptyLocation => write!(f, "cache location is empty"),
            Self::LocationIsDirectory { path } => {
                write!(f, "cache location {} is a directory", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

impl From<ConfigError> for CacheError {
    fn from(e: ConfigError) -> Self {
        CacheError::InvalidConfig {
            reason: e.to_string(),
        }
    }
}

// ── CacheConfig ────────────────────────────────────────────────────

/// Where the cache lives, which way it flows, and how often to capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// File the cache is written to or read from.
    pub location: PathBuf,
    /// Record or replay. Fixed for the controller's lifetime.
    pub mode: CacheMode,
    /// Capture interval. Ignored in replay, where every stored snapshot
    /// is restored in order.
    pub step_rate: StepRate,
}

impl CacheConfig {
    /// A config with the default step rate of 1.
    pub fn new(location: impl Into<PathBuf>, mode: CacheMode) -> Self {
        Self {
            location: location.into(),
            mode,
            step_rate: StepRate::default(),
        }
    }

    /// Shorthand for `new(location, CacheMode::Record)`.
    pub fn record(location: impl Into<PathBuf>) -> Self {
        Self::new(location, CacheMode::Record)
    }

    /// Shorthand for `new(location, CacheMode::Replay)`.
    pub fn replay(location: impl Into<PathBuf>) -> Self {
        Self::new(location, CacheMode::Replay)
    }

    /// Replace the step rate.
    pub fn with_step_rate(mut self, step_rate: StepRate) -> Self {
        self.step_rate = step_rate;
        self
    }

    /// The cache location.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Check structural invariants.
    ///
    /// Existence of the location is not checked here: a missing replay
    /// cache surfaces as [`CacheError::CacheUnavailable`] when the store
    /// opens it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.location.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLocation);
        }
        if self.location.is_dir() {
            return Err(ConfigError::LocationIsDirectory {
                path: self.location.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_step_rate_is_rejected() {
        assert_eq!(StepRate::new(0), Err(ConfigError::ZeroStepRate));
        assert_eq!(StepRate::new(8).unwrap().get(), 8);
        assert_eq!(StepRate::default(), StepRate::EVERY_STEP);
    }

    #[test]
    fn capture_steps_are_multiples_of_rate() {
        let rate = StepRate::new(8).unwrap();
        let captured: Vec<u64> = (1..=20).filter(|&s| rate.is_capture_step(s)).collect();
        assert_eq!(captured, vec![8, 16]);
        assert_eq!(rate.snapshots_for(20), 3);
        assert_eq!(StepRate::EVERY_STEP.snapshots_for(20), 21);
        assert_eq!(rate.snapshots_for(0), 1);
    }

    #[test]
    fn validate_valid_config_succeeds() {
        let cfg = CacheConfig::record("run.cache").with_step_rate(StepRate::new(4).unwrap());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.step_rate.get(), 4);
        assert!(cfg.mode.is_record());
    }

    #[test]
    fn validate_empty_location_fails() {
        match CacheConfig::replay("").validate() {
            Err(ConfigError::EmptyLocation) => {}
            other => panic!("expected EmptyLocation, got {other:?}"),
        }
    }

    #[test]
    fn validate_directory_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        match CacheConfig::record(dir.path()).validate() {
            Err(ConfigError::LocationIsDirectory { path }) => assert_eq!(path, dir.path()),
            other => panic!("expected LocationIsDirectory, got {other:?}"),
        }
    }

    #[test]
    fn config_error_converts_to_invalid_config() {
        let err: CacheError = ConfigError::ZeroStepRate.into();
        match err {
            CacheError::InvalidConfig { reason } => assert!(reason.contains("step_rate")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }
}
