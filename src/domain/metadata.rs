//! Migration metadata types
//!
//! The four identity fields every Alembic revision file declares, once in its
//! docstring header and once in its module-level assignments.

use std::fmt;

use serde::Serialize;

/// Which of the two metadata encodings a record was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Docstring header (`Revision ID:`, `Revises:`, `Create Date:`)
    Header,
    /// Assignment statements (`revision = ...`, `down_revision = ...`)
    Code,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Code => write!(f, "code"),
        }
    }
}

/// Parsed metadata for one migration file in one encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationMetadata {
    /// Human-readable title (first docstring line)
    pub name: String,
    /// Unique revision identifier
    pub revision_id: String,
    /// Parent revision; `None` marks the chain root
    pub revises: Option<String>,
    /// Creation timestamp, kept verbatim
    pub date: String,
}

impl MigrationMetadata {
    /// Create a record, normalizing a blank `revises` to the root marker
    pub fn new(
        name: impl Into<String>,
        revision_id: impl Into<String>,
        revises: Option<&str>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            revision_id: revision_id.into(),
            revises: normalize_revises(revises),
            date: date.into(),
        }
    }

    /// Whether this record starts the chain
    pub fn is_root(&self) -> bool {
        self.revises.is_none()
    }

    /// Whether this record is applied directly after `parent`
    pub fn revises_id(&self, parent: &str) -> bool {
        self.revises.as_deref() == Some(parent)
    }

    /// Diagram label: `[<revision>] <name>`
    pub fn label(&self) -> String {
        format!("[{}] {}", self.revision_id, self.name)
    }
}

/// Trim a raw parent value; blank means "no parent"
pub fn normalize_revises(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
