//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that touches the filesystem:
//! - Migration directory discovery and loading

pub mod loader;

// Re-export commonly used types
pub use loader::load_migrations;
