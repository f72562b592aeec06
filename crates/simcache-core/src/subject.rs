//! The capability contract a wrapped simulation entity must provide.

use crate::error::SubjectError;

/// A step-driven simulation entity that can be recorded and replayed.
///
/// The caching core depends on nothing else about the subject: the
/// running flag tells it when a run is over, and `step` advances the
/// simulation by one tick in record mode. Everything else the subject
/// holds is opaque and is only reached through the controller's
/// `subject()` / `subject_mut()` accessors.
///
/// # Examples
///
/// ```
/// use simcache_core::{Subject, SubjectError};
///
/// struct Counter { value: u32, running: bool }
///
/// impl Subject for Counter {
///     fn is_running(&self) -> bool { self.running }
///     fn set_running(&mut self, running: bool) { self.running = running; }
///     fn step(&mut self) -> Result<(), SubjectError> {
///         self.value += 1;
///         if self.value == 3 { self.running = false; }
///         Ok(())
///     }
/// }
///
/// let mut c = Counter { value: 0, running: true };
/// while c.is_running() { c.step().unwrap(); }
/// assert_eq!(c.value, 3);
/// ```
pub trait Subject {
    /// Whether the run is still in progress.
    fn is_running(&self) -> bool;

    /// Overwrite the running flag.
    ///
    /// The controller clears it when a replay reaches the end of the cache.
    fn set_running(&mut self, running: bool);

    /// Advance the simulation by exactly one tick.
    ///
    /// Only ever called in record mode.
    fn step(&mut self) -> Result<(), SubjectError>;
}
