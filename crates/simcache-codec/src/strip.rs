//! Typed stripping policies for narrowing what a snapshot retains.
//!
//! A subject declares which of its fields replay can do without through
//! [`Strippable::strip_policy`], and applies a policy to itself through
//! [`Strippable::apply_strip`]. [`StrippedCodec`] runs that on a copy of
//! the subject before serializing, so the live subject is never touched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use simcache_core::{CacheError, Snapshot};

use crate::codec::{decode_state, encode_state, SnapshotCodec};
use crate::history::DataCollector;

/// How much of a subject's historical time-series state to keep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryRetention {
    /// Keep every collected value.
    #[default]
    Full,
    /// Keep only the most recent value of each series.
    LatestOnly,
}

/// Which parts of a subject a snapshot may drop.
///
/// The default policy retains everything.
///
/// # Examples
///
/// ```
/// use simcache_codec::{HistoryRetention, StripPolicy};
///
/// let policy = StripPolicy::replay_minimal();
/// assert!(policy.drop_schedule);
/// assert_eq!(policy.history, HistoryRetention::LatestOnly);
/// assert!(StripPolicy::default().is_noop());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripPolicy {
    /// Drop the scheduling substructure. Replay restores state rather
    /// than activating agents, so it never needs the scheduler.
    pub drop_schedule: bool,
    /// Retention applied to collector history.
    pub history: HistoryRetention,
}

impl StripPolicy {
    /// Drop the scheduler and keep only the latest history entries.
    pub fn replay_minimal() -> Self {
        Self {
            drop_schedule: true,
            history: HistoryRetention::LatestOnly,
        }
    }

    /// `true` if applying this policy changes nothing.
    pub fn is_noop(&self) -> bool {
        !self.drop_schedule && self.history == HistoryRetention::Full
    }

    /// Apply the schedule rule to an optional scheduler field.
    pub fn apply_to_schedule<T>(&self, schedule: &mut Option<T>) {
        if self.drop_schedule {
            *schedule = None;
        }
    }

    /// Apply the history rule to a collector.
    pub fn apply_to_collector(&self, collector: &mut DataCollector) {
        if self.history == HistoryRetention::LatestOnly {
            collector.truncate_to_latest();
        }
    }
}

/// A subject that can narrow itself according to a [`StripPolicy`].
///
/// # Examples
///
/// ```
/// use simcache_codec::{DataCollector, StripPolicy, Strippable};
///
/// #[derive(Clone)]
/// struct Model { schedule: Option<Vec<u64>>, datacollector: DataCollector }
///
/// impl Strippable for Model {
///     fn strip_policy(&self) -> StripPolicy { StripPolicy::replay_minimal() }
///     fn apply_strip(&mut self, policy: &StripPolicy) {
///         policy.apply_to_schedule(&mut self.schedule);
///         policy.apply_to_collector(&mut self.datacollector);
///     }
/// }
///
/// let mut m = Model { schedule: Some(vec![1, 2]), datacollector: DataCollector::new() };
/// let policy = m.strip_policy();
/// m.apply_strip(&policy);
/// assert!(m.schedule.is_none());
/// ```
pub trait Strippable: Clone {
    /// The policy this subject's configuration declares.
    fn strip_policy(&self) -> StripPolicy;

    /// Narrow `self` in place according to `policy`.
    fn apply_strip(&mut self, policy: &StripPolicy);
}

/// Serializes a stripped copy of the subject.
///
/// Uses the subject's declared policy unless one is supplied with
/// [`StrippedCodec::with_policy`]. Restore replaces the subject wholesale
/// with the stripped state; dropped fields come back as whatever the
/// policy left behind (`None`, truncated history).
#[derive(Clone, Copy, Debug, Default)]
pub struct StrippedCodec {
    policy: Option<StripPolicy>,
}

impl StrippedCodec {
    /// Use the policy each subject declares.
    pub fn new() -> Self {
        Self { policy: None }
    }

    /// Use `policy` instead of the subject's declared one.
    pub fn with_policy(policy: StripPolicy) -> Self {
        Self {
            policy: Some(policy),
        }
    }

    fn effective_policy<S: Strippable>(&self, subject: &S) -> StripPolicy {
        self.policy.unwrap_or_else(|| subject.strip_policy())
    }
}

impl<S> SnapshotCodec<S> for StrippedCodec
where
    S: Strippable + Serialize + DeserializeOwned,
{
    fn capture(&self, subject: &S) -> Result<Snapshot, CacheError> {
        let policy = self.effective_policy(subject);
        if policy.is_noop() {
            return encode_state(subject);
        }
        let mut narrowed = subject.clone();
        narrowed.apply_strip(&policy);
        encode_state(&narrowed)
    }

    fn restore(&self, subject: &mut S, snapshot: &Snapshot) -> Result<(), CacheError> {
        *subject = decode_state(snapshot)?;
        Ok(())
    }
}
