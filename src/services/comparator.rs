//! Chain comparator - runs both metadata pipelines over one file set
//!
//! header parser -> tree builder -> renderer  => diagram A
//! code parser   -> tree builder -> renderer  => diagram B
//!
//! The verdict is plain string equality of the two diagrams.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{render_tree, Encoding, MigrationMetadata, MigrationTree};
use crate::error::{ChainError, TreeError};
use crate::parser;

/// Both parsed encodings of one revision file
#[derive(Debug, Clone)]
pub struct ParsedMigration {
    pub file: String,
    pub header: MigrationMetadata,
    pub code: MigrationMetadata,
}

impl ParsedMigration {
    /// Parse one file with both parsers; the code record reuses the header's name and date
    pub fn parse(file: impl Into<String>, text: &str) -> Result<Self, ChainError> {
        let file = file.into();
        let header = parser::header::parse(text).map_err(|source| ChainError::Parse {
            file: file.clone(),
            encoding: Encoding::Header,
            source,
        })?;
        let code = parser::code::parse(text, &header).map_err(|source| ChainError::Parse {
            file: file.clone(),
            encoding: Encoding::Code,
            source,
        })?;
        Ok(Self { file, header, code })
    }

    pub fn metadata(&self, encoding: Encoding) -> &MigrationMetadata {
        match encoding {
            Encoding::Header => &self.header,
            Encoding::Code => &self.code,
        }
    }

    /// Identity fields where the two encodings disagree
    pub fn drift(&self) -> Vec<FieldDrift> {
        let mut drift = Vec::new();
        if self.header.revision_id != self.code.revision_id {
            drift.push(FieldDrift {
                file: self.file.clone(),
                field: "revision",
                header: Some(self.header.revision_id.clone()),
                code: Some(self.code.revision_id.clone()),
            });
        }
        if self.header.revises != self.code.revises {
            drift.push(FieldDrift {
                file: self.file.clone(),
                field: "down_revision",
                header: self.header.revises.clone(),
                code: self.code.revises.clone(),
            });
        }
        drift
    }
}

/// A per-file disagreement between header and code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDrift {
    pub file: String,
    pub field: &'static str,
    pub header: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Equal,
    Divergent,
}

/// Outcome of comparing the two reconstructed chains
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub migrations: usize,
    pub header_diagram: String,
    pub code_diagram: String,
    pub verdict: Verdict,
    pub drift: Vec<FieldDrift>,
    /// Leaf revisions of the header tree
    pub heads: Vec<String>,
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        self.verdict == Verdict::Equal
    }
}

/// Parse every file, in map (filename) order
pub fn parse_all(files: &BTreeMap<String, String>) -> Result<Vec<ParsedMigration>, ChainError> {
    if files.is_empty() {
        return Err(ChainError::NoMigrations);
    }
    files
        .iter()
        .map(|(file, text)| {
            debug!("Parsing {}", file);
            ParsedMigration::parse(file.as_str(), text)
        })
        .collect()
}

/// Reconstruct the tree implied by one encoding
pub fn build_tree(
    parsed: &[ParsedMigration],
    encoding: Encoding,
) -> Result<MigrationTree, ChainError> {
    let mut declared_by: HashMap<&str, &str> = HashMap::with_capacity(parsed.len());
    for migration in parsed {
        let revision = migration.metadata(encoding).revision_id.as_str();
        if let Some(first) = declared_by.insert(revision, migration.file.as_str()) {
            return Err(ChainError::DuplicateRevision {
                encoding,
                revision: revision.to_string(),
                first: first.to_string(),
                second: migration.file.clone(),
            });
        }
    }

    let records: Vec<MigrationMetadata> = parsed
        .iter()
        .map(|migration| migration.metadata(encoding).clone())
        .collect();

    MigrationTree::build(&records).map_err(|source| {
        let culprit = match &source {
            TreeError::NoRootFound => None,
            TreeError::MultipleRoots { second, .. } => Some(second.as_str()),
            TreeError::DanglingRecord { revision, .. } => Some(revision.as_str()),
        };
        ChainError::Tree {
            encoding,
            file: culprit
                .and_then(|revision| declared_by.get(revision))
                .map(|file| file.to_string()),
            source,
        }
    })
}

/// Reconstruct and render one encoding's chain
pub fn render_encoding(parsed: &[ParsedMigration], encoding: Encoding) -> Result<String, ChainError> {
    let tree = build_tree(parsed, encoding)?;
    debug!("Built {} tree with {} nodes", encoding, tree.len());
    Ok(render_tree(&tree))
}

/// Compare the header chain against the code chain for one file set
pub fn compare(files: &BTreeMap<String, String>) -> Result<Comparison, ChainError> {
    let parsed = parse_all(files)?;
    compare_parsed(&parsed)
}

pub fn compare_parsed(parsed: &[ParsedMigration]) -> Result<Comparison, ChainError> {
    let header_tree = build_tree(parsed, Encoding::Header)?;
    let code_tree = build_tree(parsed, Encoding::Code)?;

    let header_diagram = render_tree(&header_tree);
    let code_diagram = render_tree(&code_tree);

    let verdict = if header_diagram == code_diagram {
        Verdict::Equal
    } else {
        Verdict::Divergent
    };

    let drift: Vec<FieldDrift> = parsed.iter().flat_map(ParsedMigration::drift).collect();
    let heads = header_tree
        .heads()
        .into_iter()
        .map(|meta| meta.revision_id.clone())
        .collect();

    match verdict {
        Verdict::Equal => info!("Header and code chains agree ({} migrations)", parsed.len()),
        Verdict::Divergent => warn!(
            "Header and code chains diverge ({} files with drifting fields)",
            drift
                .iter()
                .map(|d| d.file.as_str())
                .collect::<std::collections::BTreeSet<_>>()
                .len()
        ),
    }

    Ok(Comparison {
        migrations: parsed.len(),
        header_diagram,
        code_diagram,
        verdict,
        drift,
        heads,
    })
}
