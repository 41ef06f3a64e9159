//! Observability configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Default tracing level; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    #[validate(custom(function = validation::validate_log_level))]
    pub log_level: String,

    /// Collect prometheus metrics during runs.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics: true,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}
