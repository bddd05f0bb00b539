//! Disk-backed file system source.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::{normalize_path, FileSystemSource, InspectorError};

/// Directories never descended into.
const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "target", ".gradle", ".idea"];

/// Reads a repository checkout from disk.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the source.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a repository-relative path, refusing to escape the root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = PathBuf::from(normalize_path(path));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl FileSystemSource for LocalFileSystem {
    fn list_files(&self) -> Result<Vec<String>, InspectorError> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir()
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| IGNORED_DIRS.contains(&name)))
            });

        for entry in walker {
            let entry = entry.map_err(|e| InspectorError::Io {
                path: self.root.display().to_string(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                files.push(normalize_path(&relative.to_string_lossy()));
            }
        }

        debug!(root = %self.root.display(), files = files.len(), "Listed local files");
        Ok(files)
    }

    fn read(&self, path: &str) -> Result<Option<String>, InspectorError> {
        let Some(full_path) = self.resolve(path) else {
            debug!(path, "Refusing to read outside of the repository root");
            return Ok(None);
        };
        if !full_path.is_file() {
            return Ok(None);
        }
        match fs::read_to_string(&full_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InspectorError::Io {
                path: path.to_string(),
                source: e,
            }),
        }
    }
}
