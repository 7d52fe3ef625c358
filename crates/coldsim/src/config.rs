//! Simulation configuration.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

fn default_cold_start_rate() -> f64 {
    // Mean cold-start overhead of 2 seconds.
    0.5
}

fn default_seed() -> u64 {
    1
}

fn default_prefill() -> bool {
    true
}

/// YAML-serializable config.
#[derive(Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// Memory capacity in functions.
    pub capacity: usize,
    /// Rate of the exponential cold-start overhead.
    #[serde(default = "default_cold_start_rate")]
    pub cold_start_rate: f64,
    /// Simulated duration bound.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Processed-event count bound.
    #[serde(default)]
    pub max_events: Option<u64>,
    /// Warm-up duration whose measurements are discarded.
    #[serde(default)]
    pub warmup: Option<f64>,
    /// Interval between state snapshots.
    #[serde(default)]
    pub snapshot_interval: Option<f64>,
    /// Whether to start with the first `capacity` functions idle in memory (rule A6).
    #[serde(default = "default_prefill")]
    pub prefill: bool,
    /// RNG seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Simulation config. Implements Default so that you can create a default config and
/// change only the fields you need.
#[derive(Clone)]
pub struct Config {
    /// Memory capacity in functions. All functions are assumed to occupy the same
    /// amount of memory, so the budget is a function count.
    pub capacity: usize,
    /// Rate of the exponential cold-start overhead, shared by all functions.
    pub cold_start_rate: f64,
    /// Stop once the clock passes this simulated duration.
    pub duration: Option<f64>,
    /// Stop after this many processed events.
    pub max_events: Option<u64>,
    /// Reset counters once after this duration to discard the startup transient.
    pub warmup: Option<f64>,
    /// Record a [`StateSnapshot`](crate::stats::StateSnapshot) every such interval.
    pub snapshot_interval: Option<f64>,
    /// Pre-fill memory with the first `capacity` functions in the idle state.
    pub prefill: bool,
    /// Seed of the simulation-wide random number generator.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1,
            cold_start_rate: default_cold_start_rate(),
            duration: None,
            max_events: None,
            warmup: None,
            snapshot_interval: None,
            prefill: true,
            seed: default_seed(),
        }
    }
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            capacity: raw.capacity,
            cold_start_rate: raw.cold_start_rate,
            duration: raw.duration,
            max_events: raw.max_events,
            warmup: raw.warmup,
            snapshot_interval: raw.snapshot_interval,
            prefill: raw.prefill,
            seed: raw.seed,
        }
    }
}

impl Config {
    pub fn from_yaml(path: &Path) -> Self {
        let f = File::open(path).unwrap();
        let raw: RawConfig = serde_yaml::from_reader(f).unwrap();
        raw.into()
    }
}
