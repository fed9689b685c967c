//! Subcommand implementations
//!
//! Each command receives its resolved configuration from `main` and does its
//! own presentation through [`crate::ui`].

pub mod check;
pub mod inspect;
pub mod tree;
