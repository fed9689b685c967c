//! Centralized error types for revchain
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

use crate::domain::Encoding;

/// Top-level error type for a chain check run
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("{file}: invalid {encoding} metadata: {source}")]
    Parse {
        file: String,
        encoding: Encoding,
        #[source]
        source: ParseError,
    },

    #[error("{encoding} chain is broken{}: {source}", location_suffix(.file))]
    Tree {
        encoding: Encoding,
        file: Option<String>,
        #[source]
        source: TreeError,
    },

    #[error("Revision {revision} is declared by both {first} and {second} ({encoding} encoding)")]
    DuplicateRevision {
        encoding: Encoding,
        revision: String,
        first: String,
        second: String,
    },

    #[error("No migration files to check")]
    NoMigrations,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

fn location_suffix(file: &Option<String>) -> String {
    file.as_deref()
        .map(|f| format!(" at {}", f))
        .unwrap_or_default()
}

/// Metadata extraction errors for a single file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("required field `{field}` not found")]
    MissingField { field: &'static str },

    #[error("field `{field}` declared {count} times")]
    AmbiguousField { field: &'static str, count: usize },

    #[error("merge revision `{value}` has more than one parent")]
    MergeRevision { value: String },

    #[error("field `{field}` must be a string literal or None, found `{value}`")]
    UnsupportedValue { field: &'static str, value: String },
}

/// Tree reconstruction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("no root migration found (every migration revises another)")]
    NoRootFound,

    #[error("multiple root migrations: {first} and {second}")]
    MultipleRoots { first: String, second: String },

    #[error("revision {revision} revises {revises}, which is not reachable from the root")]
    DanglingRecord { revision: String, revises: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },
}

/// Migration directory loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Migrations directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Invalid glob pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::AmbiguousField {
            field: "revision",
            count: 2,
        };
        assert_eq!(err.to_string(), "field `revision` declared 2 times");
    }

    #[test]
    fn test_chain_error_names_file() {
        let err = ChainError::Parse {
            file: "0002_add_users.py".to_string(),
            encoding: Encoding::Code,
            source: ParseError::MissingField { field: "revision" },
        };
        let msg = err.to_string();
        assert!(msg.contains("0002_add_users.py"));
        assert!(msg.contains("code"));
        assert!(msg.contains("revision"));
    }

    #[test]
    fn test_tree_error_with_and_without_file() {
        let located = ChainError::Tree {
            encoding: Encoding::Header,
            file: Some("0003_orphan.py".to_string()),
            source: TreeError::DanglingRecord {
                revision: "c3".to_string(),
                revises: "zz".to_string(),
            },
        };
        assert!(located.to_string().starts_with("header chain is broken at 0003_orphan.py"));

        let unlocated = ChainError::Tree {
            encoding: Encoding::Code,
            file: None,
            source: TreeError::NoRootFound,
        };
        assert!(unlocated.to_string().starts_with("code chain is broken: no root"));
    }

    #[test]
    fn test_load_error_into_anyhow() {
        let err: anyhow::Error = LoadError::DirectoryNotFound {
            path: "alembic/versions".to_string(),
        }
        .into();
        assert!(err.to_string().contains("alembic/versions"));
        assert!(err.downcast_ref::<LoadError>().is_some());
    }

    #[test]
    fn test_config_and_load_errors_convert() {
        fn validate() -> Result<(), ChainError> {
            Err(ConfigError::InvalidValue {
                field: "include".to_string(),
                value: "[".to_string(),
            })?
        }
        let err = validate().unwrap_err();
        assert!(matches!(err, ChainError::Config(ConfigError::InvalidValue { .. })));
        assert!(err.to_string().starts_with("Configuration error: "));

        let err: ChainError = LoadError::DirectoryNotFound {
            path: "alembic/versions".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Load error: Migrations directory not found: alembic/versions"
        );
    }
}
