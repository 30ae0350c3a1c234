//! sketchvfs CLI Binary
//!
//! Command-line interface for editing stored project trees and assembling
//! browser previews.

use anyhow::Context;
use clap::Parser;
use sketchvfs::cli::{map_error, Cli, RunContext};
use sketchvfs::config::ConfigLoader;
use sketchvfs::error::ApiError;
use sketchvfs::logging::{init_logging, LoggingConfig};
use std::io::IsTerminal;
use std::process;
use tracing::{debug, info};

fn main() {
    let cli = Cli::parse();
    let color = std::io::stderr().is_terminal();

    if let Err(e) = run(&cli, color) {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) => eprintln!("{}", map_error(api_error, color)),
            None => eprintln!("error: {:#}", e),
        }
        process::exit(1);
    }
}

fn run(cli: &Cli, color: bool) -> anyhow::Result<()> {
    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(cli);
    init_logging(Some(&logging_config)).context("Failed to initialize logging")?;

    info!("sketchvfs CLI starting");

    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())?.with_color(color);
    debug!("CLI context initialized");

    let output = context.execute(&cli.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    // A bad config is reported once RunContext loads it; log with defaults meanwhile
    let mut config = ConfigLoader::resolve(&cli.workspace, cli.config.as_deref())
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.verbose {
        config.level = "info".to_string();
    }

    // CLI arguments have the highest priority
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
