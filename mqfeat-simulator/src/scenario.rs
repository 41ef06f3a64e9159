//! Scenario files: a recorded or generated sequence of packet records.
//!
//! Stored as YAML with hex payloads so scenarios can be edited by hand and
//! attached to bug reports.

use std::fs;
use std::path::Path;

use mqfeat_core::events::PacketRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario format error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Seed the scenario was generated from, if any.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub records: Vec<PacketRecord>,
}

impl Scenario {
    pub fn new(seed: Option<u64>, records: Vec<PacketRecord>) -> Self {
        Self { seed, records }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ScenarioError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqfeat_core::events::TransportMeta;

    const HAND_WRITTEN: &str = r#"
seed: 7
records:
  - timestamp: 0.25
    transport:
      protocol: tcp
      src: 10.0.0.1
      dst: 10.0.0.9
      src_port: 1883
      dst_port: 40001
    payload: "20020005"
"#;

    #[test]
    fn parses_hand_written_yaml() {
        let scenario = Scenario::from_yaml_str(HAND_WRITTEN).unwrap();
        assert_eq!(scenario.seed, Some(7));
        assert_eq!(scenario.len(), 1);
        assert_eq!(&scenario.records[0].payload[..], &[0x20, 0x02, 0x00, 0x05]);
    }

    #[test]
    fn seed_and_records_are_optional() {
        let scenario = Scenario::from_yaml_str("{}").unwrap();
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        let meta = TransportMeta::tcp(
            "10.0.0.2:50000".parse().unwrap(),
            "10.0.0.1:8883".parse().unwrap(),
        );
        let scenario = Scenario::new(
            None,
            vec![
                PacketRecord::new(0.0, meta, vec![0xC0, 0x00]),
                PacketRecord::new(0.5, meta, vec![0xE0, 0x00]),
            ],
        );
        scenario.save(&path).unwrap();
        assert_eq!(Scenario::load(&path).unwrap(), scenario);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Scenario::load("no/such/scenario.yaml").unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}
