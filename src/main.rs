mod classifier;
mod cli;
mod config;
mod directory;
mod engine;
mod error;
mod sensor;
mod ui;
mod workflow;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use config::IrrigatorConfig;
use directory::StaticFieldDirectory;
use engine::DecisionWorkflow;
use sensor::SimulatedSensorNetwork;
use ui::DecisionProgress;
use workflow::DecisionRecord;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = IrrigatorConfig::load()?;
    if let Some(max_attempts) = cli.max_attempts {
        config.max_sensor_attempts = max_attempts;
    }
    config.validate()?;

    let mut directory = StaticFieldDirectory::demo();
    for profile in &config.fields {
        directory.insert(profile.clone())?;
    }

    let sensor = match cli.seed {
        Some(seed) => SimulatedSensorNetwork::seeded(config.sensor.clone(), seed),
        None => SimulatedSensorNetwork::demo(config.sensor.clone()),
    };

    let mut workflow = DecisionWorkflow::new(directory.clone(), sensor, config.retry_policy())?;

    match cli.command {
        Command::Decide { field_id } => {
            decide(&mut workflow, field_id, cli.json).await?;
        }
        Command::Demo => {
            if cli.json {
                let mut records = Vec::new();
                for profile in directory.profiles() {
                    records.push(workflow.run(profile.field_id).await);
                }
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for profile in directory.profiles() {
                    decide(&mut workflow, profile.field_id, false).await?;
                }
            }
        }
        Command::Fields => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&directory.profiles())?);
            } else {
                for profile in directory.profiles() {
                    DecisionProgress::print_profile(&profile);
                }
            }
        }
    }

    Ok(())
}

/// Run one decision and present it. The workflow itself never fails; the
/// returned error covers presentation only.
async fn decide(
    workflow: &mut DecisionWorkflow<StaticFieldDirectory, SimulatedSensorNetwork>,
    field_id: u32,
    json: bool,
) -> Result<DecisionRecord> {
    if json {
        let record = workflow.run(field_id).await;
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(record);
    }

    let progress = DecisionProgress::start(field_id);
    let record = workflow.run(field_id).await;
    progress.complete(&record);
    progress.print_record(&record);
    Ok(record)
}

/// Logs go to stderr so JSON output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "irrigator=debug"
    } else {
        "irrigator=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
