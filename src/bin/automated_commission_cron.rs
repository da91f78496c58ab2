//! Scheduled governance jobs.
//!
//! ```text
//! automated-commission-cron [commissions|report|subscriptions|all]
//! ```
//!
//! Runs the selected task (default `all`) once against the configured
//! database, prints the outcome as JSON on stdout and exits 0 on success,
//! 1 on any failure.

use std::process::ExitCode;

use clap::Parser;

use lingua_platform::application::{CronOutcome, CronTask};
use lingua_platform::bootstrap;

#[derive(Debug, Parser)]
#[command(name = "automated-commission-cron", version, about = "Run scheduled governance tasks")]
struct Cli {
    /// Task to run: commissions, report, subscriptions or all.
    #[arg(default_value = "all", env = "LINGUA_CRON_TASK")]
    task: CronTask,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.task).await {
        Ok(outcomes) => match serde_json::to_string_pretty(&outcomes) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize cron outcome");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(task = %cli.task, error = %format!("{:#}", e), "Cron run failed");
            eprintln!("automated-commission-cron: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(task: CronTask) -> anyhow::Result<Vec<CronOutcome>> {
    let config = bootstrap::load_config()?;
    bootstrap::init_tracing(&config.server)?;
    tracing::info!(task = %task, "Starting cron run");

    let services = bootstrap::connect_services(&config).await?;
    let outcomes = services.cron.run(task).await?;

    tracing::info!(task = %task, outcomes = outcomes.len(), "Cron run finished");
    Ok(outcomes)
}
