//! Assignment statement parser
//!
//! Reads the module-level `revision` and `down_revision` assignments. Plain
//! and annotated forms are both accepted:
//!
//! ```text
//! revision = 'b2'
//! down_revision: Union[str, None] = "a1"
//! ```
//!
//! Bracketed values may span several lines, as formatters split long tuples:
//!
//! ```text
//! down_revision = (
//!     "b2",
//! )
//! ```
//!
//! Name and date only exist in the docstring, so they are carried over from
//! the header record of the same file.

use std::sync::OnceLock;

use regex::Regex;

use super::{optional, required};
use crate::domain::metadata::{normalize_revises, MigrationMetadata};
use crate::error::ParseError;

fn assignment_re(cell: &'static OnceLock<Regex>, target: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(&format!(
            r"(?m)^{}[ \t]*(?::[^=\r\n]*)?=[ \t]*([^\r\n]*)",
            regex::escape(target)
        ))
        .expect("valid assignment regex")
    })
}

fn revision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    assignment_re(&RE, "revision")
}

fn down_revision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    assignment_re(&RE, "down_revision")
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).expect("valid quoted regex"))
}

/// Right-hand side of a metadata assignment
#[derive(Debug, PartialEq, Eq)]
enum Literal<'t> {
    Str(&'t str),
    None,
    Sequence(Vec<&'t str>),
    Other(&'t str),
}

fn parse_literal(rhs: &str) -> Literal<'_> {
    if let Some(body) = sequence_body(rhs) {
        return match sequence_items(body) {
            Some(items) => Literal::Sequence(items),
            None => Literal::Other(rhs),
        };
    }
    let rhs = strip_comment(rhs).trim();
    if rhs == "None" {
        return Literal::None;
    }
    match quoted_re().captures(rhs) {
        Some(caps) if caps.get(0).map(|m| m.as_str()) == Some(rhs) => caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| Literal::Str(m.as_str()))
            .unwrap_or(Literal::Other(rhs)),
        _ => Literal::Other(rhs),
    }
}

fn closing_bracket(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        _ => None,
    }
}

/// Inside of a closed `(...)` or `[...]` value
fn sequence_body(rhs: &str) -> Option<&str> {
    let open = rhs.chars().next()?;
    let close = closing_bracket(open)?;
    rhs.strip_prefix(open)?.strip_suffix(close)
}

/// String items of a sequence body; `None` if anything else appears
fn sequence_items(body: &str) -> Option<Vec<&str>> {
    let mut items = Vec::new();
    let mut rest = skip_separators(body);
    while !rest.is_empty() {
        let quote = rest.chars().next().filter(|c| matches!(*c, '"' | '\''))?;
        let inner = &rest[1..];
        let end = inner.find(quote)?;
        items.push(&inner[..end]);
        rest = skip_separators(&inner[end + 1..]);
    }
    Some(items)
}

/// Skip whitespace, commas and `#` comments between sequence items
fn skip_separators(mut rest: &str) -> &str {
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after;
        } else if rest.starts_with('#') {
            rest = rest.find('\n').map_or("", |i| &rest[i + 1..]);
        } else {
            return rest;
        }
    }
}

/// Value text starting at `start`. A bracketed value runs to its closing
/// bracket across lines; anything else, or an unclosed bracket, ends at the
/// line break.
fn value_extent(text: &str, start: usize) -> &str {
    let rest = &text[start..];
    let line_end = rest.find(['\r', '\n']).unwrap_or(rest.len());
    let Some(close) = rest.chars().next().and_then(closing_bracket) else {
        return &rest[..line_end];
    };

    let mut quote: Option<char> = None;
    let mut in_comment = false;
    for (i, c) in rest.char_indices().skip(1) {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (Some(_), '\n') => break,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => in_comment = true,
            (None, _) if c == close => return &rest[..i + c.len_utf8()],
            _ => {}
        }
    }
    &rest[..line_end]
}

/// Trimmed value of every assignment matched by `re`
fn assignment_values<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| value_extent(text, m.start()).trim())
        .collect()
}

/// Drop a trailing `# ...` comment that sits outside quotes
fn strip_comment(rhs: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in rhs.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, '#') => return &rhs[..i],
            _ => {}
        }
    }
    rhs
}

/// Parse the assignment statements of one revision file.
///
/// `header` supplies name and date for the resulting record.
pub fn parse(text: &str, header: &MigrationMetadata) -> Result<MigrationMetadata, ParseError> {
    let revision_rhs = required("revision", assignment_values(revision_re(), text))?;
    let revision_id = match parse_literal(revision_rhs) {
        Literal::Str(value) if !value.trim().is_empty() => value.trim(),
        Literal::Str(_) | Literal::None => {
            return Err(ParseError::MissingField { field: "revision" })
        }
        Literal::Sequence(_) | Literal::Other(_) => {
            return Err(ParseError::UnsupportedValue {
                field: "revision",
                value: revision_rhs.to_string(),
            })
        }
    };

    let revises = match optional("down_revision", assignment_values(down_revision_re(), text))? {
        None => None,
        Some(rhs) => match parse_literal(rhs) {
            Literal::Str(value) => normalize_revises(Some(value)),
            Literal::None => None,
            Literal::Sequence(items) => match items.as_slice() {
                [] => None,
                [single] => normalize_revises(Some(*single)),
                _ => {
                    return Err(ParseError::MergeRevision {
                        value: rhs.to_string(),
                    })
                }
            },
            Literal::Other(_) => {
                return Err(ParseError::UnsupportedValue {
                    field: "down_revision",
                    value: rhs.to_string(),
                })
            }
        },
    };

    Ok(MigrationMetadata {
        name: header.name.clone(),
        revision_id: revision_id.to_string(),
        revises,
        date: header.date.clone(),
    })
}
