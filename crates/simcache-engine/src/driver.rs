//! Run-to-completion and run-until helpers.

use simcache_codec::SnapshotCodec;
use simcache_core::{CacheError, Subject};
use simcache_store::CacheStore;
use tracing::info;

use crate::controller::CacheController;

/// How [`CacheController::run_until`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunUntilOutcome {
    /// The condition returned `true`.
    ConditionMet {
        /// Step count at which the condition held.
        step_count: u64,
    },
    /// The subject stopped running first.
    SubjectStopped {
        /// Step count at which the subject stopped.
        step_count: u64,
    },
}

impl RunUntilOutcome {
    /// `true` for [`RunUntilOutcome::ConditionMet`].
    pub fn is_condition_met(self) -> bool {
        matches!(self, Self::ConditionMet { .. })
    }

    /// The step count at which the run stopped.
    pub fn step_count(self) -> u64 {
        match self {
            Self::ConditionMet { step_count } | Self::SubjectStopped { step_count } => step_count,
        }
    }
}

impl<S, C, T> CacheController<S, C, T>
where
    S: Subject,
    C: SnapshotCodec<S>,
    T: CacheStore,
{
    /// Step until the subject stops running, then make sure the run is
    /// finished.
    pub fn run_model(&mut self) -> Result<(), CacheError> {
        while self.is_running() {
            self.step()?;
        }
        if !self.is_run_finished() {
            self.finish()?;
        }
        Ok(())
    }

    /// Step until `condition(subject, step_count)` holds or the subject
    /// stops running.
    ///
    /// The condition is checked before every step, including the first,
    /// and once more after the subject stops.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidState`] if the subject is not running on
    /// entry. Nothing is stepped in that case.
    pub fn run_until<F>(&mut self, mut condition: F) -> Result<RunUntilOutcome, CacheError>
    where
        F: FnMut(&S, u64) -> bool,
    {
        if !self.is_running() {
            return Err(CacheError::invalid_state(
                "run_until called on a subject that is not running",
            ));
        }

        loop {
            let step_count = self.step_count();
            if condition(self.subject(), step_count) {
                return Ok(RunUntilOutcome::ConditionMet { step_count });
            }
            if !self.is_running() {
                info!(step_count, "subject stopped before the condition was satisfied");
                return Ok(RunUntilOutcome::SubjectStopped { step_count });
            }
            self.step()?;
        }
    }
}
