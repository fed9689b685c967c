use anyhow::Result;
use clap::Parser;

// Core modules
mod cli;
mod commands;
mod config;

mod domain;
mod error;
mod infrastructure;
mod observability;
mod parser;
mod services;
mod ui;

use cli::{Cli, Commands, SourceArgs};
use commands::{check, inspect, tree};
use config::CheckConfig;

/// Resolve the run configuration: config file (explicit or ./revchain.yaml),
/// then command-line overrides.
fn resolve_config(source: &SourceArgs) -> Result<CheckConfig> {
    let cwd = std::env::current_dir()?;
    let config = CheckConfig::discover(source.config.as_deref(), &cwd)?
        .with_overrides(source.overrides());
    tracing::debug!("Resolved config: {:?}", config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "warn".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .init();

    // Execute command
    match cli.command {
        Commands::Check {
            source,
            json,
            no_fail,
            emit_event,
        } => {
            let mut config = resolve_config(&source)?;
            if no_fail {
                config.fail_on_divergence = false;
            }
            check::execute(config, json, emit_event).await
        }
        Commands::Tree { source, from } => {
            let config = resolve_config(&source)?;
            tree::execute(config, from.into()).await
        }
        Commands::Inspect { file } => inspect::execute(&file).await,
    }
}
