//! Print the revision tree reconstructed from one encoding.

use anyhow::{Context, Result};

use crate::config::CheckConfig;
use crate::domain::Encoding;
use crate::infrastructure::load_migrations;
use crate::services::comparator;
use crate::ui;

/// Load, parse and render a single encoding's tree
pub async fn render(config: &CheckConfig, encoding: Encoding) -> Result<String> {
    config.validate()?;
    let files = load_migrations(config).await.with_context(|| {
        format!(
            "Failed to load migrations from {}",
            config.migrations_dir.display()
        )
    })?;
    let parsed = comparator::parse_all(&files)?;
    Ok(comparator::render_encoding(&parsed, encoding)?)
}

pub async fn execute(config: CheckConfig, encoding: Encoding) -> Result<()> {
    let diagram = render(&config, encoding).await?;

    ui::print_header(&format!("Revision Tree ({})", encoding));
    ui::print_diagram(&config.migrations_dir.display().to_string(), &diagram);
    ui::print_info(&format!("{} migrations", diagram.lines().count()));
    Ok(())
}
