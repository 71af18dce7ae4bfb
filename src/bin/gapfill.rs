//! gapfill CLI Binary
//!
//! Loads layered configuration, installs logging and dispatches one command.

use anyhow::Context;
use clap::Parser;
use gapfill::cli::{map_error, Cli, Commands, RunContext};
use gapfill::config::{ConfigLoader, GapfillConfig, LoadOptions};
use gapfill::logging::init_logging;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!(workspace = %cli.workspace.display(), "gapfill starting");

    let context = match RunContext::new(config, &cli.workspace) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error_class = e.class(), "Error initializing store: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    if matches!(cli.command, Commands::Run) {
        let token = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current slot");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "Failed to listen for interrupt"),
            }
        });
    }

    match context.execute(&cli.command, cancel).await {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!(error_class = e.class(), "Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Layered config with CLI flags applied on top.
fn load_config(cli: &Cli) -> anyhow::Result<GapfillConfig> {
    let options = LoadOptions {
        config_file: cli.config.clone(),
        ..LoadOptions::default()
    };
    let mut config = ConfigLoader::load_with(&cli.workspace, &options)
        .with_context(|| format!("Failed to load configuration for {}", cli.workspace.display()))?;

    if let Some(ref store) = cli.store {
        config.storage.path = store.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.parse().context("Invalid --log-format")?;
    }

    Ok(config)
}
