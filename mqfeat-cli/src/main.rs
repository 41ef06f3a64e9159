//! ## mqfeat-cli
//! **Command-line frontend for MQTT feature extraction**
//!
//! Extracts 28-value feature vectors from recorded or simulated MQTT traffic,
//! fuzzes the pipeline with damaged packets and prints the feature table.
//!
//! Vectors go to stdout (or `--output`); logs go to stderr.

use clap::Parser;
use mqfeat_telemetry::EventLogger;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_ref())?;
    EventLogger::init(&config.telemetry.log_level);

    commands::run_command(cli, config).await
}
