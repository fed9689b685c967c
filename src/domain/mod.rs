//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod metadata;
pub mod render;
pub mod tree;

// Re-export commonly used types
pub use metadata::{Encoding, MigrationMetadata};
pub use render::render_tree;
pub use tree::MigrationTree;
