//! Simulator defaults, overridable from the command line.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Seed for deterministic simulation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of client sessions to generate.
    #[serde(default = "default_sessions")]
    #[validate(range(min = 1, max = 100000))]
    pub sessions: usize,

    #[serde(default)]
    #[validate(nested)]
    pub chaos: ChaosConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            sessions: default_sessions(),
            chaos: ChaosConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ChaosConfig {
    /// Chance that a generated payload is truncated or corrupted.
    #[serde(default = "default_fault_probability")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub fault_probability: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            fault_probability: default_fault_probability(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_sessions() -> usize {
    32
}

fn default_fault_probability() -> f64 {
    0.1
}
