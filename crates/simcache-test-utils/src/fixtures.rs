//! Reusable subjects and codecs shared by the simcache test suites.

use serde::{Deserialize, Serialize};
use simcache_codec::{AgentRecord, DataCollector, SnapshotCodec, StripPolicy, Strippable};
use simcache_core::{CacheError, Snapshot, Subject, SubjectError};

// ── Fibonacci ──────────────────────────────────────────────────────

/// Deterministic subject: each step advances one Fibonacci term.
///
/// Stops running once `current` exceeds [`Fibonacci::LIMIT`], which
/// happens on step [`Fibonacci::STEPS_TO_LIMIT`]. Every value is also
/// appended to `history`, so full-state snapshots grow each step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fibonacci {
    pub previous: u64,
    pub current: u64,
    pub history: Vec<u64>,
    pub running: bool,
}

impl Fibonacci {
    pub const LIMIT: u64 = 100_000;

    /// Steps taken from [`Fibonacci::new`] until the subject stops.
    pub const STEPS_TO_LIMIT: u64 = 25;

    /// `previous = 0`, `current = 1`, running.
    pub fn new() -> Self {
        Self {
            previous: 0,
            current: 1,
            history: Vec::new(),
            running: true,
        }
    }

    /// All-zero state, used as the starting point for replay so that
    /// any value observed afterwards must have come from the cache.
    pub fn blank() -> Self {
        Self {
            previous: 0,
            current: 0,
            history: Vec::new(),
            running: true,
        }
    }
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::new()
    }
}

impl Subject for Fibonacci {
    fn is_running(&self) -> bool {
        self.running
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    fn step(&mut self) -> Result<(), SubjectError> {
        let next = self
            .previous
            .checked_add(self.current)
            .ok_or_else(|| SubjectError::ConstraintViolation {
                constraint: "fibonacci term overflowed u64".into(),
            })?;
        self.previous = self.current;
        self.current = next;
        self.history.push(next);
        if next > Self::LIMIT {
            self.running = false;
        }
        Ok(())
    }
}

// ── ReplayOnly ─────────────────────────────────────────────────────

/// Wraps a subject and refuses to step it.
///
/// Serializes exactly like the wrapped subject, so a cache recorded
/// from `S` replays into `ReplayOnly<S>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplayOnly<S> {
    pub inner: S,
}

impl<S> ReplayOnly<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl ReplayOnly<Fibonacci> {
    /// A replay-only Fibonacci starting from [`Fibonacci::blank`].
    pub fn fibonacci() -> Self {
        Self::new(Fibonacci::blank())
    }
}

impl<S: Subject> Subject for ReplayOnly<S> {
    fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    fn set_running(&mut self, running: bool) {
        self.inner.set_running(running);
    }

    fn step(&mut self) -> Result<(), SubjectError> {
        Err(SubjectError::ExecutionFailed {
            reason: "step is not supposed to be called during replay".into(),
        })
    }
}

// ── CurrentOnlyCodec ───────────────────────────────────────────────

/// Stores only `current`, as 8 little-endian bytes.
///
/// Enough for replay consumers that read nothing but the current term.
/// The running flag is not stored; replay ends when the cache runs out.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentOnlyCodec;

impl CurrentOnlyCodec {
    fn encode(current: u64) -> Snapshot {
        Snapshot::new(current.to_le_bytes().to_vec())
    }

    fn decode(snapshot: &Snapshot) -> Result<u64, CacheError> {
        let bytes: [u8; 8] = snapshot.as_bytes().try_into().map_err(|_| {
            CacheError::corrupt(format!(
                "expected an 8-byte snapshot, got {} bytes",
                snapshot.len()
            ))
        })?;
        Ok(u64::from_le_bytes(bytes))
    }
}

impl SnapshotCodec<Fibonacci> for CurrentOnlyCodec {
    fn capture(&self, subject: &Fibonacci) -> Result<Snapshot, CacheError> {
        Ok(Self::encode(subject.current))
    }

    fn restore(&self, subject: &mut Fibonacci, snapshot: &Snapshot) -> Result<(), CacheError> {
        subject.current = Self::decode(snapshot)?;
        Ok(())
    }
}

impl SnapshotCodec<ReplayOnly<Fibonacci>> for CurrentOnlyCodec {
    fn capture(&self, subject: &ReplayOnly<Fibonacci>) -> Result<Snapshot, CacheError> {
        self.capture(&subject.inner)
    }

    fn restore(
        &self,
        subject: &mut ReplayOnly<Fibonacci>,
        snapshot: &Snapshot,
    ) -> Result<(), CacheError> {
        self.restore(&mut subject.inner, snapshot)
    }
}

// ── Colony ─────────────────────────────────────────────────────────

/// Subject with a scheduler and a collector that grows every step.
///
/// Each step activates agents in schedule order, bumps each agent's
/// energy by its id, and collects the total energy plus one record per
/// agent. Stops after `max_steps` steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Colony {
    pub energy: Vec<u64>,
    pub schedule: Option<Vec<usize>>,
    pub datacollector: DataCollector,
    pub steps: u64,
    pub max_steps: u64,
    pub running: bool,
    pub policy: StripPolicy,
}

impl Colony {
    pub fn new(agents: usize, max_steps: u64) -> Self {
        Self {
            energy: vec![0; agents],
            schedule: Some((0..agents).rev().collect()),
            datacollector: DataCollector::new(),
            steps: 0,
            max_steps,
            running: true,
            policy: StripPolicy::replay_minimal(),
        }
    }

    /// Same state, declaring `policy` as its strip policy.
    pub fn with_policy(mut self, policy: StripPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn total_energy(&self) -> u64 {
        self.energy.iter().sum()
    }
}

impl Subject for Colony {
    fn is_running(&self) -> bool {
        self.running
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    fn step(&mut self) -> Result<(), SubjectError> {
        let order = self
            .schedule
            .as_ref()
            .ok_or_else(|| SubjectError::ExecutionFailed {
                reason: "colony has no schedule to activate agents with".into(),
            })?;
        for &agent in order {
            self.energy[agent] += agent as u64 + 1;
        }
        self.steps += 1;
        let total = self.total_energy() as f64;
        self.datacollector.collect_model("total_energy", total);
        let records = self
            .energy
            .iter()
            .enumerate()
            .map(|(id, &e)| AgentRecord {
                agent_id: id as u64,
                values: vec![e as f64],
            })
            .collect();
        self.datacollector.collect_agents(self.steps, records);
        if self.steps >= self.max_steps {
            self.running = false;
        }
        Ok(())
    }
}

impl Strippable for Colony {
    fn strip_policy(&self) -> StripPolicy {
        self.policy
    }

    fn apply_strip(&mut self, policy: &StripPolicy) {
        policy.apply_to_schedule(&mut self.schedule);
        policy.apply_to_collector(&mut self.datacollector);
    }
}
