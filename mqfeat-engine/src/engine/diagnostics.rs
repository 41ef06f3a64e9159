//! Bug reports for failed runs.
//!
//! A report is a YAML file carrying everything needed to reproduce the
//! failure, including the scenario when one was generated.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use mqfeat_simulator::Scenario;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BugReport {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
}

impl BugReport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            seed: None,
            expected_digest: None,
            actual_digest: None,
            scenario: None,
        }
    }
}

#[derive(Debug)]
pub struct DiagnosticsCollector {
    dir: PathBuf,
    bug_reports: Vec<PathBuf>,
}

impl DiagnosticsCollector {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            bug_reports: Vec::new(),
        }
    }

    /// Writes `report` into the report directory and remembers its path.
    pub fn record_bug_report(&mut self, report: &BugReport) -> std::io::Result<PathBuf> {
        let path = generate_bug_report(&self.dir, self.bug_reports.len(), report)?;
        self.bug_reports.push(path.clone());
        Ok(path)
    }

    pub fn bug_reports(&self) -> &[PathBuf] {
        &self.bug_reports
    }
}

/// Writes one report as `bug_report_<unix secs>_<n>.yaml` under `dir`.
pub fn generate_bug_report(dir: &Path, n: usize, report: &BugReport) -> std::io::Result<PathBuf> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let path = dir.join(format!("bug_report_{now}_{n}.yaml"));
    let text = serde_yaml::to_string(report).map_err(std::io::Error::other)?;
    fs::create_dir_all(dir)?;
    fs::write(&path, text)?;
    Ok(path)
}
