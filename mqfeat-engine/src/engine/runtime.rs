//! Extraction runtime - ties scenarios, the extraction pipeline, digests and
//! diagnostics together for the frontends.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mqfeat_config::MqfeatConfig;
use mqfeat_core::events::PacketRecord;
use mqfeat_features::ExtractedVector;
use mqfeat_simulator::{Scenario, Simulator};
use mqfeat_telemetry::{EventLogger, MetricsRecorder};
use opentelemetry::KeyValue;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, instrument, warn};

use super::diagnostics::{BugReport, DiagnosticsCollector};
use super::error::EngineError;
use super::output::{vector_digest, write_vectors};
use super::pipeline::{
    extract_sequential, extract_sharded, split_records, ExtractionMode, ExtractionSettings,
};

/// Outcome of one extraction run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub vectors: usize,
    pub digest: String,
}

impl RunSummary {
    fn new(records: usize, vectors: &[ExtractedVector]) -> Self {
        Self {
            records,
            vectors: vectors.len(),
            digest: vector_digest(vectors),
        }
    }

    pub fn skipped(&self) -> usize {
        self.records.saturating_sub(self.vectors)
    }
}

/// Parameters of a `simulate` run.
#[derive(Clone, Debug, Default)]
pub struct SimulationOptions {
    pub seed: u64,
    pub sessions: usize,
    /// Probability of damaging each generated payload; 0 disables chaos.
    pub fault_probability: f64,
    /// Where to save the generated scenario.
    pub save: Option<PathBuf>,
    /// Where to write the vectors; nothing is written when `None`.
    pub output: Option<PathBuf>,
    pub validate_hash: Option<String>,
}

/// Parameters of a `fuzz` run.
#[derive(Clone, Debug)]
pub struct FuzzOptions {
    pub seed: u64,
    /// Number of iterations; 0 runs until interrupted.
    pub iterations: usize,
    pub max_sessions: usize,
    pub fault_probability: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FuzzReport {
    pub iterations: usize,
    pub records: usize,
    pub vectors: usize,
}

/// Runs extraction for the frontends.
///
/// Owns the configuration, the metrics and the bug-report collector, so the
/// CLI only has to pick a mode.
pub struct ExtractionRuntime {
    config: Arc<MqfeatConfig>,
    pub metrics: MetricsRecorder,
    diagnostics: Mutex<DiagnosticsCollector>,
}

impl ExtractionRuntime {
    /// Bug reports go to the working directory unless
    /// [`with_report_dir`](Self::with_report_dir) says otherwise.
    pub fn new(config: MqfeatConfig, metrics: MetricsRecorder) -> Self {
        debug!("Engine config: {:?}", config.engine);
        Self {
            config: Arc::new(config),
            metrics,
            diagnostics: Mutex::new(DiagnosticsCollector::new(".")),
        }
    }

    pub fn with_report_dir<P: Into<PathBuf>>(self, dir: P) -> Self {
        Self {
            diagnostics: Mutex::new(DiagnosticsCollector::new(dir)),
            ..self
        }
    }

    pub fn config(&self) -> &MqfeatConfig {
        &self.config
    }

    pub fn bug_reports(&self) -> Vec<PathBuf> {
        self.diagnostics.lock().bug_reports().to_vec()
    }

    fn metrics(&self) -> Option<&MetricsRecorder> {
        self.config.telemetry.metrics.then_some(&self.metrics)
    }

    /// Extracts vectors from `records`, splitting segments into PDUs first
    /// when configured to.
    pub async fn extract(
        &self,
        records: Vec<PacketRecord>,
        mode: ExtractionMode,
    ) -> Result<Vec<ExtractedVector>, EngineError> {
        let settings = ExtractionSettings::from(self.config.as_ref());
        let records = if settings.split_pdus {
            split_records(records, &settings)
        } else {
            records
        };

        match mode {
            ExtractionMode::Sequential => {
                Ok(extract_sequential(&records, &settings, self.metrics()))
            }
            ExtractionMode::Sharded => extract_sharded(records, &settings, self.metrics()).await,
        }
    }

    /// Extracts vectors from a scenario file.
    #[instrument(level = "info", name = "run_extract", skip(self))]
    pub async fn run_extract(
        &self,
        input: &Path,
        output: Option<&Path>,
        mode: ExtractionMode,
        validate_hash: Option<&str>,
    ) -> Result<RunSummary, EngineError> {
        let scenario = Scenario::load(input).map_err(|e| {
            error!("Failed to load scenario {}: {e}", input.display());
            e
        })?;
        info!("Extracting {} records from {}", scenario.len(), input.display());

        let records = scenario.len();
        let vectors = self.extract(scenario.records, mode).await?;
        write_vectors(&vectors, output)?;

        let summary = RunSummary::new(records, &vectors);
        self.check_digest(&summary, validate_hash, BugReport::new("digest mismatch on extract"))?;
        self.log_summary("extract_complete", &summary, None).await;
        Ok(summary)
    }

    /// Generates a scenario and extracts vectors from it.
    #[instrument(level = "info", name = "run_simulation_mode", skip(self))]
    pub async fn run_simulation(
        &self,
        options: &SimulationOptions,
    ) -> Result<RunSummary, EngineError> {
        let mut simulator = Simulator::new(options.seed).with_chaos(options.fault_probability);
        let scenario = simulator.generate(options.sessions);
        info!(
            "Simulated {} sessions as {} records ({} faults)",
            options.sessions,
            scenario.len(),
            simulator.faults_injected()
        );

        if let Some(path) = &options.save {
            scenario.save(path)?;
            info!("Scenario saved to {}", path.display());
        }

        let records = scenario.len();
        let vectors = self
            .extract(scenario.records.clone(), ExtractionMode::Sharded)
            .await?;
        if let Some(path) = &options.output {
            write_vectors(&vectors, Some(path))?;
        }

        let summary = RunSummary::new(records, &vectors);
        let mut report = BugReport::new("digest mismatch on simulation");
        report.seed = Some(options.seed);
        report.scenario = Some(scenario);
        self.check_digest(&summary, options.validate_hash.as_deref(), report)?;
        self.log_summary("simulation_complete", &summary, Some(options.seed))
            .await;
        Ok(summary)
    }

    /// Repeatedly simulates with chaos and checks that every vector stays in
    /// bounds and that both extraction modes agree.
    #[instrument(level = "info", name = "run_fuzz_mode", skip(self))]
    pub async fn run_fuzz(&self, options: &FuzzOptions) -> Result<FuzzReport, EngineError> {
        if options.iterations == 0 {
            warn!("Infinite fuzz mode activated (Ctrl-C to exit)");
        }
        let max_sessions = options.max_sessions.max(1);
        let mut report = FuzzReport::default();

        while options.iterations == 0 || report.iterations < options.iterations {
            let seed = options.seed.wrapping_add(report.iterations as u64);
            let sessions = SmallRng::seed_from_u64(seed).random_range(1..=max_sessions);
            let scenario = Simulator::new(seed)
                .with_chaos(options.fault_probability)
                .generate(sessions);
            debug!(seed, sessions, records = scenario.len(), "fuzz iteration");

            let sequential = self
                .extract(scenario.records.clone(), ExtractionMode::Sequential)
                .await?;
            let sharded = self
                .extract(scenario.records.clone(), ExtractionMode::Sharded)
                .await?;

            let violation = if let Some(v) = sequential.iter().find(|v| !v.features.is_bounded()) {
                Some(format!("vector {} out of bounds: {:?}", v.sequence, v.features.values()))
            } else if sequential != sharded {
                Some("sequential and sharded extraction disagree".to_string())
            } else {
                None
            };

            if let Some(reason) = violation {
                error!(seed, "Fuzz failure: {reason}");
                let mut bug = BugReport::new(reason.clone());
                bug.seed = Some(seed);
                bug.actual_digest = Some(vector_digest(&sequential));
                bug.scenario = Some(scenario);
                let path = self.diagnostics.lock().record_bug_report(&bug)?;
                return Err(EngineError::FuzzFailure {
                    seed,
                    reason,
                    report: path,
                });
            }

            report.iterations += 1;
            report.records += scenario.len();
            report.vectors += sequential.len();
            if report.iterations % 10 == 0 {
                info!("Fuzz progress: {} iterations", report.iterations);
            }
        }

        info!(
            "Fuzz testing complete: {} iterations, {} records, {} vectors",
            report.iterations, report.records, report.vectors
        );
        EventLogger::log_event(
            "fuzz_complete",
            vec![
                KeyValue::new("seed", options.seed.to_string()),
                KeyValue::new("iterations", report.iterations.to_string()),
                KeyValue::new("vectors", report.vectors.to_string()),
            ],
        )
        .await;
        Ok(report)
    }

    fn check_digest(
        &self,
        summary: &RunSummary,
        expected: Option<&str>,
        mut report: BugReport,
    ) -> Result<(), EngineError> {
        let Some(expected) = expected else {
            return Ok(());
        };
        if expected.eq_ignore_ascii_case(&summary.digest) {
            info!("Digest validated: {}", summary.digest);
            return Ok(());
        }

        error!("Digest mismatch! Expected: {expected}, got: {}", summary.digest);
        report.expected_digest = Some(expected.to_string());
        report.actual_digest = Some(summary.digest.clone());
        let path = self.diagnostics.lock().record_bug_report(&report)?;
        error!("Bug report saved to: {}", path.display());
        Err(EngineError::DigestMismatch {
            expected: expected.to_string(),
            actual: summary.digest.clone(),
            report: path,
        })
    }

    async fn log_summary(&self, event: &str, summary: &RunSummary, seed: Option<u64>) {
        info!(
            "Run complete: {} records, {} vectors, {} skipped, digest {}",
            summary.records,
            summary.vectors,
            summary.skipped(),
            summary.digest
        );
        let mut metadata = vec![
            KeyValue::new("records", summary.records.to_string()),
            KeyValue::new("vectors", summary.vectors.to_string()),
            KeyValue::new("digest", summary.digest.clone()),
        ];
        if let Some(seed) = seed {
            metadata.push(KeyValue::new("seed", seed.to_string()));
        }
        EventLogger::log_event(event, metadata).await;
    }
}
