//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services take already-loaded inputs; infrastructure adapters do the I/O.

pub mod comparator;

// Re-export commonly used types
pub use comparator::{Comparison, FieldDrift, ParsedMigration, Verdict};
