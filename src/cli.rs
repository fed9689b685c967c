//! CLI definitions for revchain
//!
//! This module contains all CLI argument parsing structures using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ConfigOverrides;
use crate::domain::Encoding;

#[derive(Parser)]
#[command(
    name = "revchain",
    version,
    about = "Consistency checker for Alembic migration revision chains",
    long_about = "Rebuilds the revision tree of a migrations directory twice, once from the\n\
                  docstring headers and once from the revision/down_revision assignments,\n\
                  and fails when the two trees differ."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by commands that read a migrations directory
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Migrations directory, e.g. ./alembic/versions
    #[arg(long, env = "REVCHAIN_PATH")]
    pub path: Option<PathBuf>,

    /// Config file (defaults to ./revchain.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Glob a file name must match (default: *.py)
    #[arg(long)]
    pub include: Option<String>,

    /// File name or glob to skip (can be specified multiple times)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Also read subdirectories
    #[arg(long)]
    pub recursive: bool,
}

impl SourceArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            migrations_dir: self.path.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            recursive: self.recursive,
        }
    }
}

/// Metadata encoding selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    /// Docstring header fields
    Header,
    /// revision / down_revision assignments
    Code,
}

impl From<SourceArg> for Encoding {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Header => Encoding::Header,
            SourceArg::Code => Encoding::Code,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare the header chain with the code chain
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the comparison as JSON instead of diagrams
        #[arg(long)]
        json: bool,

        /// Report divergence without a failing exit code
        #[arg(long)]
        no_fail: bool,

        /// Emit a REVCHAIN_EVENT line for log collectors
        #[arg(long)]
        emit_event: bool,
    },

    /// Print the revision tree of one encoding
    Tree {
        #[command(flatten)]
        source: SourceArgs,

        /// Encoding to reconstruct the tree from
        #[arg(long, value_enum, default_value = "header")]
        from: SourceArg,
    },

    /// Show both encodings of a single revision file
    Inspect {
        /// Path to the revision file
        file: PathBuf,
    },
}
