//! # Check Configuration
//!
//! Resolution order: CLI flags → `--config` file (or `./revchain.yaml`) → defaults.
//!
//! ## Example `revchain.yaml`
//!
//! ```yaml
//! migrations_dir: alembic/versions
//! include: "*.py"
//! exclude:
//!   - "__init__.py"
//! recursive: false
//! fail_on_divergence: true
//! ```
//!
//! The resolved [`CheckConfig`] is passed explicitly into each command;
//! nothing reads it back from process-wide state.

mod check;

pub use check::{CheckConfig, ConfigOverrides};
