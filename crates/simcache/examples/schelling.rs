//! Schelling segregation: record a run with stripped snapshots, then
//! replay it without simulating.
//!
//! Demonstrates:
//!   1. A subject that owns a random scheduler and a data collector
//!   2. Declaring what replay can drop through `Strippable`
//!   3. Recording with `StrippedCodec` into a chunk stream
//!   4. Replaying the stream step by step and reading the collector
//!   5. Comparing stripped and full-state snapshot sizes
//!
//! Run with:
//!   cargo run --example schelling [-- <cache path>]
//!
//! Set `RUST_LOG=debug` to see every captured and restored snapshot.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use simcache::codec::AgentRecord;
use simcache::prelude::*;
use tracing::info;

// ─── Model parameters ───────────────────────────────────────────

const WIDTH: usize = 20;
const HEIGHT: usize = 20;
const DENSITY: f64 = 0.8;
const MINORITY_PC: f64 = 0.2;
const HOMOPHILY: usize = 3;
const SEED: u64 = 42;
const MAX_STEPS: u64 = 200;

// ─── Schelling model ────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Agent {
    x: usize,
    y: usize,
    minority: bool,
}

#[derive(Clone, Serialize, Deserialize)]
struct Schelling {
    agents: Vec<Agent>,
    /// Agent index per cell, row-major.
    grid: Vec<Option<usize>>,
    /// Activation order for the next step. Replay never activates.
    schedule: Option<Vec<usize>>,
    datacollector: DataCollector,
    happy: usize,
    steps: u64,
    running: bool,
    #[serde(skip, default = "seeded_rng")]
    rng: ChaCha8Rng,
}

fn seeded_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}

/// Uniform draw in `[0, 1)`.
fn unit(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

fn below(rng: &mut ChaCha8Rng, n: usize) -> usize {
    (rng.next_u64() % n as u64) as usize
}

impl Schelling {
    fn new() -> Self {
        let mut rng = seeded_rng();
        let mut agents = Vec::new();
        let mut grid = vec![None; WIDTH * HEIGHT];
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if unit(&mut rng) < DENSITY {
                    grid[y * WIDTH + x] = Some(agents.len());
                    agents.push(Agent {
                        x,
                        y,
                        minority: unit(&mut rng) < MINORITY_PC,
                    });
                }
            }
        }
        let schedule = Some((0..agents.len()).collect());
        let mut model = Self {
            agents,
            grid,
            schedule,
            datacollector: DataCollector::new(),
            happy: 0,
            steps: 0,
            running: true,
            rng,
        };
        model.collect();
        model
    }

    /// Same-type agents among the eight neighbours, on a torus.
    fn similar_neighbours(&self, agent: usize) -> usize {
        let Agent { x, y, minority } = self.agents[agent];
        let mut similar = 0;
        for dy in [HEIGHT - 1, 0, 1] {
            for dx in [WIDTH - 1, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let cell = ((y + dy) % HEIGHT) * WIDTH + (x + dx) % WIDTH;
                if let Some(other) = self.grid[cell] {
                    if self.agents[other].minority == minority {
                        similar += 1;
                    }
                }
            }
        }
        similar
    }

    fn move_to_empty(&mut self, agent: usize) {
        let empties: Vec<usize> = (0..self.grid.len())
            .filter(|&c| self.grid[c].is_none())
            .collect();
        if empties.is_empty() {
            return;
        }
        let target = empties[below(&mut self.rng, empties.len())];
        let a = &mut self.agents[agent];
        self.grid[a.y * WIDTH + a.x] = None;
        a.x = target % WIDTH;
        a.y = target / WIDTH;
        self.grid[target] = Some(agent);
    }

    fn shuffle_schedule(&mut self) {
        if let Some(order) = self.schedule.as_mut() {
            for i in (1..order.len()).rev() {
                let j = (self.rng.next_u64() % (i as u64 + 1)) as usize;
                order.swap(i, j);
            }
        }
    }

    fn collect(&mut self) {
        self.datacollector.collect_model("happy", self.happy as f64);
        let records = self
            .agents
            .iter()
            .enumerate()
            .map(|(id, a)| AgentRecord {
                agent_id: id as u64,
                values: vec![a.x as f64, a.y as f64, f64::from(u8::from(a.minority))],
            })
            .collect();
        self.datacollector.collect_agents(self.steps, records);
    }
}

impl Subject for Schelling {
    fn is_running(&self) -> bool {
        self.running
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    fn step(&mut self) -> Result<(), SubjectError> {
        self.shuffle_schedule();
        let order = self
            .schedule
            .clone()
            .ok_or_else(|| SubjectError::ExecutionFailed {
                reason: "schelling model has no schedule".into(),
            })?;

        self.happy = 0;
        for agent in order {
            if self.similar_neighbours(agent) < HOMOPHILY {
                self.move_to_empty(agent);
            } else {
                self.happy += 1;
            }
        }
        self.steps += 1;
        self.collect();

        if self.happy == self.agents.len() || self.steps >= MAX_STEPS {
            self.running = false;
        }
        Ok(())
    }
}

impl Strippable for Schelling {
    fn strip_policy(&self) -> StripPolicy {
        StripPolicy::replay_minimal()
    }

    fn apply_strip(&mut self, policy: &StripPolicy) {
        policy.apply_to_schedule(&mut self.schedule);
        policy.apply_to_collector(&mut self.datacollector);
    }
}

fn render(model: &Schelling) -> String {
    let mut out = String::with_capacity((WIDTH + 1) * HEIGHT);
    for row in model.grid.chunks(WIDTH) {
        for cell in row {
            out.push(match cell {
                None => '.',
                Some(a) if model.agents[*a].minority => 'o',
                Some(_) => 'x',
            });
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let scratch = tempfile::tempdir()?;
    let path = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| scratch.path().join("schelling.stream"));

    println!("=== Schelling record/replay ===\n");

    // ----------------------------------------------------------------
    // Phase 1: simulate and record stripped snapshots.
    // ----------------------------------------------------------------

    let mut record = CacheController::new(
        Schelling::new(),
        CacheConfig::record(&path),
        StrippedCodec::new(),
        StreamingStore::new(),
    )?;
    println!("Agents: {}", record.subject().agents.len());
    record.run_model()?;
    let simulated = record.into_subject();
    println!(
        "Simulated {} steps, {} of {} agents happy",
        simulated.steps,
        simulated.happy,
        simulated.agents.len()
    );

    let stripped = StrippedCodec::new().capture(&simulated)?.len();
    let full = FullStateCodec.capture(&simulated)?.len();
    println!("Final snapshot: {stripped} bytes stripped vs {full} bytes full state");
    println!("Cache stream: {} bytes\n", std::fs::metadata(&path)?.len());

    // ----------------------------------------------------------------
    // Phase 2: replay; the subject's step is never called.
    // ----------------------------------------------------------------

    let mut replay = CacheController::new(
        Schelling::new(),
        CacheConfig::replay(&path),
        StrippedCodec::new(),
        StreamingStore::new(),
    )?;
    let mut happy_series = Vec::new();
    while replay.is_running() {
        replay.step()?;
        if let Some(happy) = replay.subject().datacollector.latest_model_value("happy") {
            happy_series.push(happy as usize);
        }
    }
    info!(steps = replay.step_count(), "replay finished");

    let replayed = replay.subject();
    println!("Replayed {} steps", replay.step_count());
    println!("Happy agents per step: {happy_series:?}");
    println!("\nFinal grid (x majority, o minority):\n{}", render(replayed));

    assert_eq!(replayed.happy, simulated.happy);
    assert_eq!(replay.step_count(), simulated.steps);
    assert!(replayed.schedule.is_none());
    println!("Replay matches simulation.");
    Ok(())
}
