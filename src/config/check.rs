//! Chain check configuration.

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "revchain.yaml";

/// Settings for one chain check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Directory holding the revision files (relative paths resolve against
    /// the config file's directory)
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,

    /// Glob a file name must match to be treated as a revision file
    #[serde(default = "default_include")]
    pub include: String,

    /// File names or glob patterns to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Descend into subdirectories of `migrations_dir`
    #[serde(default)]
    pub recursive: bool,

    /// Exit non-zero when the header and code chains diverge (default: true)
    #[serde(default = "default_true")]
    pub fail_on_divergence: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            migrations_dir: default_migrations_dir(),
            include: default_include(),
            exclude: default_exclude(),
            recursive: false,
            fail_on_divergence: true,
        }
    }
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("alembic/versions")
}

fn default_include() -> String {
    "*.py".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["__init__.py".to_string()]
}

fn default_true() -> bool {
    true
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub migrations_dir: Option<PathBuf>,
    pub include: Option<String>,
    pub exclude: Vec<String>,
    pub recursive: bool,
}

impl CheckConfig {
    /// Load a YAML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            message: format!("{}: {}", path.display(), e),
        })?;
        let mut config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                message: format!("{}: {}", path.display(), e),
            })?;

        if config.migrations_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.migrations_dir = base.join(&config.migrations_dir);
            }
        }
        Ok(config)
    }

    /// Resolve the config for a run: an explicit file must exist, otherwise
    /// `revchain.yaml` in `cwd` is used when present, otherwise defaults.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    debug!("Using config file {}", candidate.display());
                    Self::load(&candidate)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self {
                        migrations_dir: cwd.join(default_migrations_dir()),
                        ..Self::default()
                    })
                }
            }
        }
    }

    /// Apply command-line overrides; CLI excludes add to the configured ones
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(dir) = overrides.migrations_dir {
            self.migrations_dir = dir;
        }
        if let Some(include) = overrides.include {
            self.include = include;
        }
        self.exclude.extend(overrides.exclude);
        self.recursive |= overrides.recursive;
        self
    }

    /// Check that every pattern compiles
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, pattern) in std::iter::once(("include", &self.include))
            .chain(self.exclude.iter().map(|p| ("exclude", p)))
        {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidValue {
                field: field.to_string(),
                value: format!("{} ({})", pattern, e.msg),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config: CheckConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CheckConfig::default());
        assert_eq!(config.include, "*.py");
        assert_eq!(config.exclude, vec!["__init__.py".to_string()]);
        assert!(config.fail_on_divergence);
        assert!(!config.recursive);
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
migrations_dir: db/versions
include: "*_rev.py"
exclude:
  - "legacy_*.py"
recursive: true
fail_on_divergence: false
"#;
        let config: CheckConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.migrations_dir, PathBuf::from("db/versions"));
        assert_eq!(config.include, "*_rev.py");
        assert_eq!(config.exclude, vec!["legacy_*.py".to_string()]);
        assert!(config.recursive);
        assert!(!config.fail_on_divergence);
    }

    #[test]
    fn test_load_resolves_relative_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revchain.yaml");
        std::fs::write(&path, "migrations_dir: versions\n").unwrap();

        let config = CheckConfig::load(&path).unwrap();
        assert_eq!(config.migrations_dir, dir.path().join("versions"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CheckConfig::load(Path::new("/nonexistent/revchain.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revchain.yaml");
        std::fs::write(&path, "exclude: [unterminated\n").unwrap();

        let err = CheckConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CheckConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.migrations_dir, dir.path().join("alembic/versions"));
    }

    #[test]
    fn test_discover_picks_up_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "include: \"*.revision\"\n").unwrap();

        let config = CheckConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.include, "*.revision");
    }

    #[test]
    fn test_overrides() {
        let config = CheckConfig::default().with_overrides(ConfigOverrides {
            migrations_dir: Some(PathBuf::from("other")),
            include: None,
            exclude: vec!["skip_me.py".to_string()],
            recursive: true,
        });
        assert_eq!(config.migrations_dir, PathBuf::from("other"));
        assert_eq!(config.include, "*.py");
        assert_eq!(
            config.exclude,
            vec!["__init__.py".to_string(), "skip_me.py".to_string()]
        );
        assert!(config.recursive);
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let config = CheckConfig {
            exclude: vec!["[unclosed".to_string()],
            ..CheckConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "exclude"
        ));
        assert!(CheckConfig::default().validate().is_ok());
    }
}
