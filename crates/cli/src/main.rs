//! Snapsweep CLI - snapsweep command

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use cli_lib::config::{self, SweepConfig};
use cli_lib::{cmd, logging, signal, Cli, Commands, RunArgs};
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Exit status after Ctrl-C / SIGTERM (128 + SIGINT)
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let run_args = match &cli.command {
        Some(Commands::Run(args)) => args.clone(),
        Some(Commands::Config) | None => RunArgs::default(),
    };

    // Layer flags/env over the config file
    let file = config::load_file(cli.settings.config.as_deref())?;
    let overrides = cli.settings.overrides(run_args.dry_run);

    match cli.command {
        Some(Commands::Config) => {
            // Shown even when incomplete, so the gaps are visible
            let config = SweepConfig::merge(file, overrides);
            cmd::config::run(&config, cli.settings.config.as_deref());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Run(_)) | None => {
            let config = SweepConfig::resolve(file, overrides)?;
            logging::init(&config.log_level, cli.settings.log_format)?;

            // One clock reading for the whole run
            let policy = config.policy(Utc::now());

            let cancel = CancellationToken::new();
            signal::cancel_on_shutdown(cancel.clone());

            let summary = cmd::run::run(&config, &policy, run_args.output, cancel).await?;

            if summary.cancelled {
                Ok(ExitCode::from(EXIT_CANCELLED))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
