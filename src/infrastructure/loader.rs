//! Migration loader - reads revision files from disk
//!
//! Lists the migrations directory, keeps files whose name matches the include
//! glob and none of the exclude globs, and returns their contents keyed by
//! path relative to the directory. The map orders by that key, which fixes
//! sibling order in the rendered trees.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::CheckConfig;
use crate::error::LoadError;

/// Compiled include/exclude filter
#[derive(Debug)]
pub struct FileFilter {
    include: Pattern,
    exclude: Vec<Pattern>,
}

impl FileFilter {
    pub fn new(include: &str, exclude: &[String]) -> Result<Self, LoadError> {
        let compile = |pattern: &str| {
            Pattern::new(pattern).map_err(|e| LoadError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.msg.to_string(),
            })
        };
        Ok(Self {
            include: compile(include)?,
            exclude: exclude
                .iter()
                .map(|p| compile(p.as_str()))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn from_config(config: &CheckConfig) -> Result<Self, LoadError> {
        Self::new(&config.include, &config.exclude)
    }

    /// Whether a file name (not a path) should be loaded
    pub fn accepts(&self, filename: &str) -> bool {
        self.include.matches(filename) && !self.exclude.iter().any(|p| p.matches(filename))
    }
}

/// List the revision files under `dir`, sorted by relative path
pub fn discover_files(
    dir: &Path,
    filter: &FileFilter,
    recursive: bool,
) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| e.file_name() != "__pycache__")
    {
        let entry = entry.map_err(|e| LoadError::Read {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(filename) = entry.file_name().to_str() else {
            debug!("Skipping non UTF-8 file name {:?}", entry.path());
            continue;
        };
        if filter.accepts(filename) {
            files.push(entry.into_path());
        } else {
            debug!("Skipping {}", filename);
        }
    }

    files.sort();
    Ok(files)
}

/// Map key for a file: its path below `dir`, with `/` separators
fn relative_key(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Load every revision file selected by `config`
pub async fn load_migrations(config: &CheckConfig) -> Result<BTreeMap<String, String>, LoadError> {
    let dir = &config.migrations_dir;
    let filter = FileFilter::from_config(config)?;
    let paths = discover_files(dir, &filter, config.recursive)?;

    let mut files = BTreeMap::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| LoadError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        files.insert(relative_key(dir, &path), content);
    }

    info!("Loaded {} migration files from {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn config_for(dir: &Path) -> CheckConfig {
        CheckConfig {
            migrations_dir: dir.to_path_buf(),
            ..CheckConfig::default()
        }
    }

    #[test]
    fn test_filter_include_and_exclude() {
        let filter = FileFilter::new("*.py", &["__init__.py".to_string(), "tmp_*".to_string()])
            .unwrap();
        assert!(filter.accepts("0001_init.py"));
        assert!(!filter.accepts("__init__.py"));
        assert!(!filter.accepts("tmp_scratch.py"));
        assert!(!filter.accepts("README.md"));
    }

    #[test]
    fn test_filter_invalid_pattern() {
        let err = FileFilter::new("[", &[]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPattern { pattern, .. } if pattern == "["));
    }

    #[tokio::test]
    async fn test_load_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "0002_b.py", "second");
        write(dir.path(), "0001_a.py", "first");
        write(dir.path(), "__init__.py", "");
        write(dir.path(), "notes.txt", "ignored");
        write(dir.path(), "__pycache__/0001_a.cpython-311.py", "cached");
        write(dir.path(), "nested/0003_c.py", "nested");

        let files = load_migrations(&config_for(dir.path())).await.unwrap();
        let keys: Vec<_> = files.keys().cloned().collect();
        assert_eq!(keys, vec!["0001_a.py", "0002_b.py"]);
        assert_eq!(files["0001_a.py"], "first");
    }

    #[tokio::test]
    async fn test_load_recursive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "0001_a.py", "first");
        write(dir.path(), "branch/0002_b.py", "second");
        write(dir.path(), "__pycache__/0003_c.py", "cached");

        let config = CheckConfig {
            recursive: true,
            ..config_for(dir.path())
        };
        let files = load_migrations(&config).await.unwrap();
        let keys: Vec<_> = files.keys().cloned().collect();
        assert_eq!(keys, vec!["0001_a.py", "branch/0002_b.py"]);
    }

    #[test]
    fn test_load_missing_directory() {
        let config = config_for(Path::new("/nonexistent/alembic/versions"));
        let err = tokio_test::block_on(load_migrations(&config)).unwrap_err();
        assert!(matches!(err, LoadError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = tokio_test::block_on(load_migrations(&config_for(dir.path()))).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(
            relative_key(Path::new("/repo/versions"), Path::new("/repo/versions/a/b.py")),
            "a/b.py"
        );
    }
}
