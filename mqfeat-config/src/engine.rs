//! Extraction runtime sizing.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct EngineConfig {
    /// Number of flow shards, each drained by its own worker.
    #[serde(default = "default_shards")]
    #[validate(range(min = 1, max = 256))]
    #[validate(custom(function = validation::validate_power_of_two))]
    pub shards: usize,

    /// Bound of every per-shard queue.
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 16, max = 1048576))]
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shards: default_shards(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_shards() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    4096
}
