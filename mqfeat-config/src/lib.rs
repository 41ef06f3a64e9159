//! # mqfeat Configuration System
//!
//! Layered configuration for the feature extraction pipeline.
//!
//! ## Features
//! - **Unified Configuration**: one document covering ingest, engine,
//!   telemetry and simulator settings
//! - **Validation**: every section is checked with `validator` after merging
//! - **Environment Awareness**: per-environment files and `MQFEAT_*` overrides

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod engine;
mod error;
mod ingest;
mod simulator;
mod telemetry;
pub mod validation;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use ingest::IngestConfig;
pub use simulator::{ChaosConfig, SimulatorConfig};
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/mqfeat.yaml";
const ENV_PREFIX: &str = "MQFEAT_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct MqfeatConfig {
    #[serde(default)]
    #[validate(nested)]
    pub ingest: IngestConfig,

    #[serde(default)]
    #[validate(nested)]
    pub engine: EngineConfig,

    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    #[validate(nested)]
    pub simulator: SimulatorConfig,
}

impl MqfeatConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/mqfeat.yaml`, if present
    /// 3. `config/<MQFEAT_ENV>.yaml`, if present (`MQFEAT_ENV` defaults to `production`)
    /// 4. `MQFEAT_*` environment variables, `__` separating nested keys
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(MqfeatConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("MQFEAT_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file, still honouring environment
    /// overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let figment =
            Figment::from(Serialized::defaults(MqfeatConfig::default())).merge(Yaml::file(path));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }
}
