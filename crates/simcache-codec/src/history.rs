//! Historical time-series state collected by a subject during a run.
//!
//! A [`DataCollector`] grows by one entry per reporter per step, so a
//! full-state snapshot of a subject that owns one gets larger every
//! step even though replay only ever reads the most recent values.
//! [`DataCollector::truncate_to_latest`] is what
//! [`HistoryRetention::LatestOnly`](crate::HistoryRetention) applies.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reporter values for one agent at one step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Identifier of the agent the values belong to.
    pub agent_id: u64,
    /// Reporter values, in reporter registration order.
    pub values: Vec<f64>,
}

/// Per-step series of model-level and agent-level reporter values.
///
/// Model series are keyed by reporter name and keep insertion order.
/// Agent records are keyed by the step they were collected at.
///
/// # Examples
///
/// ```
/// use simcache_codec::DataCollector;
///
/// let mut dc = DataCollector::new();
/// for step in 0..4 {
///     dc.collect_model("happy", step as f64);
/// }
/// assert_eq!(dc.model_series("happy"), Some(&[0.0, 1.0, 2.0, 3.0][..]));
///
/// dc.truncate_to_latest();
/// assert_eq!(dc.model_series("happy"), Some(&[3.0][..]));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataCollector {
    model_vars: IndexMap<String, Vec<f64>>,
    agent_records: IndexMap<u64, Vec<AgentRecord>>,
}

impl DataCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to the named model-level series.
    pub fn collect_model(&mut self, reporter: &str, value: f64) {
        match self.model_vars.get_mut(reporter) {
            Some(series) => series.push(value),
            None => {
                self.model_vars.insert(reporter.to_owned(), vec![value]);
            }
        }
    }

    /// Store the agent records collected at `step`, replacing any
    /// previous records for the same step.
    pub fn collect_agents(&mut self, step: u64, records: Vec<AgentRecord>) {
        self.agent_records.insert(step, records);
    }

    /// The full series for a model-level reporter.
    pub fn model_series(&self, reporter: &str) -> Option<&[f64]> {
        self.model_vars.get(reporter).map(Vec::as_slice)
    }

    /// The most recent value of a model-level reporter.
    pub fn latest_model_value(&self, reporter: &str) -> Option<f64> {
        self.model_vars.get(reporter).and_then(|s| s.last().copied())
    }

    /// Agent records for a given step.
    pub fn agent_records(&self, step: u64) -> Option<&[AgentRecord]> {
        self.agent_records.get(&step).map(Vec::as_slice)
    }

    /// The most recently collected agent-record step and its records.
    pub fn latest_agent_records(&self) -> Option<(u64, &[AgentRecord])> {
        self.agent_records
            .last()
            .map(|(step, records)| (*step, records.as_slice()))
    }

    /// Number of steps for which agent records are held.
    pub fn agent_step_count(&self) -> usize {
        self.agent_records.len()
    }

    /// Drop all history except the most recent entry of each series and
    /// the most recent agent-record step.
    pub fn truncate_to_latest(&mut self) {
        for series in self.model_vars.values_mut() {
            if let Some(&last) = series.last() {
                series.clear();
                series.push(last);
            }
        }
        let keep = self.agent_records.len().saturating_sub(1);
        self.agent_records.drain(..keep);
    }
}
