//! Chain check command
//!
//! Loads the migrations directory, reconstructs the header and code chains
//! and compares their diagrams. A divergence prints both diagrams, the line
//! diff and the drifting fields, then fails unless disabled.

use anyhow::Result;
use colored::Colorize;
use tracing::info;

use crate::config::CheckConfig;
use crate::error::ChainError;
use crate::infrastructure::load_migrations;
use crate::observability::{CheckTracker, EventSink};
use crate::services::{comparator, Comparison};
use crate::ui;

/// Load and compare, without printing anything
pub async fn run(config: &CheckConfig) -> Result<Comparison, ChainError> {
    config.validate()?;
    let files = load_migrations(config).await?;
    comparator::compare(&files)
}

/// Execute the check command
pub async fn execute(config: CheckConfig, json: bool, emit_event: bool) -> Result<()> {
    info!("Checking revision chain in {}", config.migrations_dir.display());
    let tracker = CheckTracker::new(config.migrations_dir.display().to_string())
        .with_sink(EventSink::for_report(json));

    let comparison = match run(&config).await {
        Ok(comparison) => comparison,
        Err(e) => {
            let e = anyhow::Error::new(e).context(format!(
                "Revision chain check failed for {}",
                config.migrations_dir.display()
            ));
            if emit_event {
                tracker.emit_failed(&e);
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        report(&comparison);
    }

    if emit_event {
        tracker.emit_completed(&comparison);
    }

    if !comparison.is_equal() && config.fail_on_divergence {
        anyhow::bail!(
            "Header and code revision chains diverge in {}",
            config.migrations_dir.display()
        );
    }
    Ok(())
}

fn report(comparison: &Comparison) {
    ui::print_header("Revision Chain Check");

    ui::print_diagram("Header chain (docstrings):", &comparison.header_diagram);

    if comparison.is_equal() {
        ui::print_success(&format!(
            "Header and code chains match ({} migrations)",
            comparison.migrations
        ));
    } else {
        ui::print_diagram("Code chain (assignments):", &comparison.code_diagram);
        ui::print_diff(&comparison.header_diagram, &comparison.code_diagram);
        ui::print_drift(&comparison.drift);
        ui::print_error("Header and code chains diverge");
    }

    if comparison.heads.len() > 1 {
        ui::print_warning(&format!(
            "Chain has {} heads: {}",
            comparison.heads.len(),
            comparison.heads.join(", ").bold()
        ));
    }
}
