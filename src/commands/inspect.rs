//! Inspect a single revision file
//!
//! Shows what each parser extracted and whether the identity fields agree.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::fs;

use crate::services::ParsedMigration;
use crate::ui;

/// One row of the inspect table
#[derive(Debug, PartialEq, Eq)]
pub struct FieldRow {
    pub field: &'static str,
    pub header: String,
    pub code: String,
}

impl FieldRow {
    pub fn agrees(&self) -> bool {
        self.header == self.code
    }
}

fn display(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "<root>".to_string())
}

/// Field-by-field view of both encodings
pub fn field_rows(parsed: &ParsedMigration) -> Vec<FieldRow> {
    vec![
        FieldRow {
            field: "name",
            header: parsed.header.name.clone(),
            code: parsed.code.name.clone(),
        },
        FieldRow {
            field: "revision",
            header: parsed.header.revision_id.clone(),
            code: parsed.code.revision_id.clone(),
        },
        FieldRow {
            field: "down_revision",
            header: display(&parsed.header.revises),
            code: display(&parsed.code.revises),
        },
        FieldRow {
            field: "date",
            header: parsed.header.date.clone(),
            code: parsed.code.date.clone(),
        },
    ]
}

pub async fn execute(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read revision file: {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let parsed = ParsedMigration::parse(name, &text)?;
    let rows = field_rows(&parsed);

    ui::print_header(&format!("Inspect {}", parsed.file));
    println!(
        "   {:<15} {:<30} {:<30}",
        "FIELD".bold(),
        "HEADER".bold(),
        "CODE".bold()
    );
    for row in &rows {
        let marker = if row.agrees() { "✓".green() } else { "✗".red() };
        println!(
            "   {:<15} {:<30} {:<30} {}",
            row.field, row.header, row.code, marker
        );
    }
    println!();

    if rows.iter().all(FieldRow::agrees) {
        ui::print_success("Header and code agree");
    } else {
        ui::print_warning("Header and code disagree");
    }
    Ok(())
}
