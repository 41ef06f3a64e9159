use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mqfeat_config::MqfeatConfig;
use mqfeat_engine::{ExtractionMode, ExtractionRuntime, FuzzOptions, SimulationOptions};
use mqfeat_features::FEATURE_CONTRACT;
use mqfeat_telemetry::MetricsRecorder;
use tracing::info;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file; defaults to config/mqfeat.yaml and config/<MQFEAT_ENV>.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Write prometheus metrics for the run to this file
    #[arg(long, global = true)]
    pub metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract feature vectors from a scenario file
    Extract(ExtractArgs),
    /// Generate a deterministic scenario and extract vectors from it
    Simulate(SimulateArgs),
    /// Run chaos simulations until a vector leaves [0, 1] or the modes disagree
    Fuzz(FuzzArgs),
    /// Print the feature table
    Contract,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(short, long)]
    pub input: PathBuf,
    /// Vector output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Use a single flow store instead of the sharded workers
    #[arg(long)]
    pub sequential: bool,
    #[arg(long)]
    pub validate_hash: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub sessions: Option<usize>,
    /// Damage payloads with the configured fault probability
    #[arg(long)]
    pub chaos: bool,
    /// Save the generated scenario for replay with `extract`
    #[arg(long)]
    pub save: Option<PathBuf>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub validate_hash: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FuzzArgs {
    /// Initial seed (incremented every iteration)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of iterations (0 for unlimited)
    #[arg(long, default_value_t = 100)]
    pub iterations: usize,
    #[arg(long)]
    pub max_sessions: Option<usize>,
}

pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<MqfeatConfig> {
    match path {
        Some(path) => MqfeatConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display())),
        None => MqfeatConfig::load().context("loading configuration"),
    }
}

pub async fn run_command(cli: Cli, config: MqfeatConfig) -> anyhow::Result<()> {
    let simulator = config.simulator.clone();
    let metrics = MetricsRecorder::new().context("creating metrics registry")?;
    let runtime = ExtractionRuntime::new(config, metrics);

    match cli.command {
        Commands::Extract(args) => {
            let mode = if args.sequential {
                ExtractionMode::Sequential
            } else {
                ExtractionMode::Sharded
            };
            let summary = runtime
                .run_extract(
                    &args.input,
                    args.output.as_deref(),
                    mode,
                    args.validate_hash.as_deref(),
                )
                .await?;
            eprintln!("digest: {}", summary.digest);
        }
        Commands::Simulate(args) => {
            let options = SimulationOptions {
                seed: args.seed.unwrap_or(simulator.seed),
                sessions: args.sessions.unwrap_or(simulator.sessions),
                fault_probability: if args.chaos {
                    simulator.chaos.fault_probability
                } else {
                    0.0
                },
                save: args.save,
                output: args.output,
                validate_hash: args.validate_hash,
            };
            let summary = runtime.run_simulation(&options).await?;
            eprintln!("digest: {}", summary.digest);
        }
        Commands::Fuzz(args) => {
            let options = FuzzOptions {
                seed: args.seed.unwrap_or(simulator.seed),
                iterations: args.iterations,
                max_sessions: args.max_sessions.unwrap_or(simulator.sessions),
                fault_probability: simulator.chaos.fault_probability,
            };
            let report = runtime.run_fuzz(&options).await?;
            eprintln!(
                "fuzz: {} iterations, {} records, {} vectors",
                report.iterations, report.records, report.vectors
            );
        }
        Commands::Contract => print_contract(),
    }

    if let Some(path) = cli.metrics_out {
        std::fs::write(&path, runtime.metrics.gather_metrics()?)
            .with_context(|| format!("writing metrics to {}", path.display()))?;
        info!("Metrics written to {}", path.display());
    }
    Ok(())
}

fn print_contract() {
    println!("{:>3}  {:<24} normalization", "idx", "feature");
    for feature in FEATURE_CONTRACT.iter() {
        println!("{:>3}  {:<24} {}", feature.index, feature.name, feature.normalization);
    }
}
