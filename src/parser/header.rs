//! Docstring header parser
//!
//! Reads `"""<name>`, `Revision ID:`, `Revises:` and `Create Date:`.
//! Label values are matched with horizontal whitespace only, so an empty
//! `Revises:` line never swallows the line after it.

use std::sync::OnceLock;

use regex::Regex;

use super::{captures, optional, required};
use crate::domain::metadata::{normalize_revises, MigrationMetadata};
use crate::error::ParseError;

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^[rRuU]?"""([^\r\n]*)"#).expect("valid name regex"))
}

fn label_re(cell: &'static OnceLock<Regex>, label: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(&format!(r"(?m)^[ \t]*{}:[ \t]*([^\r\n]*)", regex::escape(label)))
            .expect("valid label regex")
    })
}

fn revision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, "Revision ID")
}

fn revises_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, "Revises")
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, "Create Date")
}

/// Parse the docstring header of one revision file
pub fn parse(text: &str) -> Result<MigrationMetadata, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let name = parse_name(text)?;
    let revision_id = required("Revision ID", captures(revision_re(), text))?;
    let revises = optional("Revises", captures(revises_re(), text))?;
    let date = required("Create Date", captures(date_re(), text))?;

    if let Some(value) = revises {
        if value.contains(',') {
            return Err(ParseError::MergeRevision {
                value: value.to_string(),
            });
        }
    }

    Ok(MigrationMetadata {
        name,
        revision_id: revision_id.to_string(),
        revises: normalize_revises(revises),
        date: date.to_string(),
    })
}

fn parse_name(text: &str) -> Result<String, ParseError> {
    let line = name_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ParseError::MissingField { field: "name" })?;

    // Single-line docstrings close on the same line.
    let name = line.trim().trim_end_matches("\"\"\"").trim();
    if name.is_empty() {
        return Err(ParseError::MissingField { field: "name" });
    }
    Ok(name.to_string())
}
