//! Metadata parsers for Alembic revision files
//!
//! Each revision file carries its identity twice:
//!
//! ```text
//! """add users table
//!
//! Revision ID: b2
//! Revises: a1
//! Create Date: 2024-01-02 10:00:00.000000
//!
//! """
//! revision = "b2"
//! down_revision = "a1"
//! ```
//!
//! [`header`] reads the docstring, [`code`] reads the assignments. Fields are
//! located by their own label anywhere in the file, never by line offset.

pub mod code;
pub mod header;

use regex::Regex;

use crate::error::ParseError;

/// Trimmed first capture group of every match of `re` in `text`
fn captures<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect()
}

/// Zero or one occurrence; more is ambiguous
fn optional<'t>(field: &'static str, values: Vec<&'t str>) -> Result<Option<&'t str>, ParseError> {
    match values.as_slice() {
        [] => Ok(None),
        [value] => Ok(Some(*value)),
        _ => Err(ParseError::AmbiguousField {
            field,
            count: values.len(),
        }),
    }
}

/// Exactly one non-blank occurrence
fn required<'t>(field: &'static str, values: Vec<&'t str>) -> Result<&'t str, ParseError> {
    optional(field, values)?
        .filter(|value| !value.is_empty())
        .ok_or(ParseError::MissingField { field })
}
