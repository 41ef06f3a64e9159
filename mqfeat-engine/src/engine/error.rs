use std::path::PathBuf;

use mqfeat_config::ConfigError;
use mqfeat_core::CoreError;
use mqfeat_simulator::ScenarioError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vector output error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Extraction worker failed: {0}")]
    Join(#[from] JoinError),

    #[error("Invalid engine setup: {0}")]
    Core(#[from] CoreError),

    #[error(
        "Digest mismatch: expected {expected}, got {actual} (bug report: {})",
        report.display()
    )]
    DigestMismatch {
        expected: String,
        actual: String,
        report: PathBuf,
    },

    #[error("Fuzz iteration with seed {seed} failed: {reason} (bug report: {})", report.display())]
    FuzzFailure {
        seed: u64,
        reason: String,
        report: PathBuf,
    },
}
