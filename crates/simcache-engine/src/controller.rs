//! The record/replay cache controller.
//!
//! [`CacheController`] wraps a [`Subject`] and interposes on its step
//! function. In record mode each step runs the subject's own logic and
//! periodically captures a snapshot into a [`CacheStore`]. In replay mode
//! each step restores the next stored snapshot instead, so the subject's
//! step logic never runs.
//!
//! # Cardinality
//!
//! The cache always starts with the snapshot taken at construction,
//! before any step. Recording `n` steps at rate `r` therefore stores
//! `n / r + 1` snapshots, and replaying that cache halts after exactly
//! `n / r` steps.
//!
//! # Ownership model
//!
//! The controller owns the subject, the codec, and the store. All
//! mutation goes through `&mut self`; a single controller is driven by
//! a single caller.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use simcache_codec::{FullStateCodec, SnapshotCodec};
use simcache_core::{CacheError, CacheMode, Subject};
use simcache_store::{CacheStore, MemoryStore, StreamingStore};
use tracing::{debug, info, warn};

use crate::config::{CacheConfig, StepRate};

// Compile-time assertion: both built-in stores can move between threads
// together with the controller that owns them.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<MemoryStore>();
        assert_send::<StreamingStore>();
    }
};

/// Record/replay controller around a step-driven subject.
///
/// `C` decides what a snapshot contains and `T` decides where snapshots
/// go. Both are injected at construction.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use simcache_core::{Subject, SubjectError};
/// use simcache_engine::{CacheConfig, CacheController};
///
/// #[derive(Serialize, Deserialize)]
/// struct Countdown { left: u32, running: bool }
///
/// impl Subject for Countdown {
///     fn is_running(&self) -> bool { self.running }
///     fn set_running(&mut self, running: bool) { self.running = running; }
///     fn step(&mut self) -> Result<(), SubjectError> {
///         self.left -= 1;
///         self.running = self.left > 0;
///         Ok(())
///     }
/// }
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("countdown.cache");
///
/// let subject = Countdown { left: 3, running: true };
/// let mut rec = CacheController::in_memory(subject, CacheConfig::record(&path)).unwrap();
/// rec.run_model().unwrap();
///
/// let blank = Countdown { left: 99, running: true };
/// let mut rep = CacheController::in_memory(blank, CacheConfig::replay(&path)).unwrap();
/// rep.run_model().unwrap();
/// assert_eq!(rep.subject().left, 0);
/// assert_eq!(rep.step_count(), 3);
/// ```
pub struct CacheController<S, C = FullStateCodec, T = MemoryStore> {
    subject: S,
    codec: C,
    store: T,
    config: CacheConfig,
    step_count: u64,
    run_finished: bool,
}

impl<S> CacheController<S, FullStateCodec, MemoryStore>
where
    S: Subject + Serialize + DeserializeOwned,
{
    /// Full-state snapshots held in memory and written as one compressed
    /// artifact when the run finishes.
    pub fn in_memory(subject: S, config: CacheConfig) -> Result<Self, CacheError> {
        Self::new(subject, config, FullStateCodec, MemoryStore::default())
    }
}

impl<S> CacheController<S, FullStateCodec, StreamingStore>
where
    S: Subject + Serialize + DeserializeOwned,
{
    /// Full-state snapshots streamed to disk one chunk at a time.
    pub fn streaming(subject: S, config: CacheConfig) -> Result<Self, CacheError> {
        Self::new(subject, config, FullStateCodec, StreamingStore::new())
    }
}

impl<S, C, T> CacheController<S, C, T>
where
    S: Subject,
    C: SnapshotCodec<S>,
    T: CacheStore,
{
    /// Validate `config`, open `store`, and seed the run.
    ///
    /// Record captures and appends the initial snapshot. Replay restores
    /// the subject from the first stored snapshot, and clears the running
    /// flag straight away if that was the only one.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidConfig`] if `config` fails validation.
    /// - [`CacheError::CacheUnavailable`] if replaying a missing location.
    /// - [`CacheError::CorruptCache`] if the cache is malformed or empty.
    pub fn new(subject: S, config: CacheConfig, codec: C, mut store: T) -> Result<Self, CacheError> {
        config.validate()?;
        store.open(&config.location, config.mode)?;

        let mut controller = Self {
            subject,
            codec,
            store,
            config,
            step_count: 0,
            run_finished: false,
        };

        match controller.config.mode {
            CacheMode::Record => controller.capture()?,
            CacheMode::Replay => {
                if !controller.replay_next()? {
                    return Err(CacheError::corrupt("cache contains no snapshots"));
                }
            }
        }

        debug!(
            mode = %controller.config.mode,
            path = %controller.config.location.display(),
            step_rate = controller.config.step_rate.get(),
            "cache controller ready"
        );
        Ok(controller)
    }

    /// Advance the run by one step.
    ///
    /// Record runs the subject's own step, then captures a snapshot when
    /// the new step count is a multiple of the step rate. Replay restores
    /// the next snapshot and never calls [`Subject::step`]. Either way the
    /// run is finished as soon as the subject stops running.
    ///
    /// A replay whose subject has already stopped, such as one seeded from
    /// a single-snapshot cache, only finishes the run. The step count is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidState`] if the run is already finished.
    /// - [`CacheError::SubjectFailed`] with the subject's error, unchanged.
    /// - Any codec or store error from capturing or restoring.
    pub fn step(&mut self) -> Result<(), CacheError> {
        if self.run_finished {
            return Err(CacheError::invalid_state("step called after the run finished"));
        }

        match self.config.mode {
            CacheMode::Record => {
                self.subject.step()?;
                self.step_count += 1;
                if self.config.step_rate.is_capture_step(self.step_count) {
                    self.capture()?;
                }
            }
            CacheMode::Replay => {
                // Nothing left to restore: finish without counting a step.
                if !self.subject.is_running() {
                    return self.finish();
                }
                self.step_count += 1;
                if !self.replay_next()? {
                    self.subject.set_running(false);
                }
            }
        }

        if !self.subject.is_running() {
            self.finish()?;
        }
        Ok(())
    }

    /// Finish the run.
    ///
    /// Record finalizes the store: the memory store writes its artifact
    /// and the streaming store writes its terminator. Replay releases the
    /// read handle. Calling this again is a no-op that logs a warning.
    pub fn finish(&mut self) -> Result<(), CacheError> {
        if self.run_finished {
            warn!(
                path = %self.config.location.display(),
                "run already finished, ignoring repeated finish"
            );
            return Ok(());
        }

        self.store.finalize()?;
        self.run_finished = true;
        info!(
            mode = %self.config.mode,
            steps = self.step_count,
            written = self.store.snapshots_written(),
            read = self.store.snapshots_read(),
            "run finished"
        );
        Ok(())
    }

    /// Capture the current state and append it to the store.
    fn capture(&mut self) -> Result<(), CacheError> {
        let snapshot = self.codec.capture(&self.subject)?;
        let bytes = snapshot.len();
        self.store.append(&snapshot)?;
        debug!(step = self.step_count, bytes, "captured snapshot");
        Ok(())
    }

    /// Restore from the next stored snapshot. Returns `false` if there
    /// was none. Clears the running flag when the cache has no more.
    fn replay_next(&mut self) -> Result<bool, CacheError> {
        let Some(snapshot) = self.store.next_snapshot()? else {
            return Ok(false);
        };
        self.codec.restore(&mut self.subject, &snapshot)?;
        debug!(step = self.step_count, bytes = snapshot.len(), "restored snapshot");
        if self.store.is_exhausted()? {
            self.subject.set_running(false);
        }
        Ok(true)
    }
}

impl<S, C, T> CacheController<S, C, T>
where
    S: Subject,
{
    /// Record or replay, as configured.
    pub fn mode(&self) -> CacheMode {
        self.config.mode
    }

    /// Steps taken by this controller, in either mode.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// The configured capture interval.
    pub fn step_rate(&self) -> StepRate {
        self.config.step_rate
    }

    /// The cache location.
    pub fn location(&self) -> &Path {
        &self.config.location
    }

    /// `true` once [`finish`](Self::finish) has completed.
    pub fn is_run_finished(&self) -> bool {
        self.run_finished
    }

    /// The subject's running flag.
    pub fn is_running(&self) -> bool {
        self.subject.is_running()
    }

    /// Set the subject's running flag. Clearing it makes
    /// [`run_model`](Self::run_model) stop after the current step.
    pub fn set_running(&mut self, running: bool) {
        self.subject.set_running(running);
    }

    /// The wrapped subject.
    pub fn subject(&self) -> &S {
        &self.subject
    }

    /// Mutable access to the wrapped subject.
    pub fn subject_mut(&mut self) -> &mut S {
        &mut self.subject
    }

    /// Consume the controller and return the subject. An unfinished
    /// run is abandoned without finalizing the store.
    pub fn into_subject(self) -> S {
        self.subject
    }

    /// Read-only view of the store.
    pub fn store(&self) -> &T {
        &self.store
    }
}
