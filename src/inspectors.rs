//! Read-only, cached inspection of a repository's file tree.
//!
//! Practices never touch a file system directly. They query a
//! [`FileInspector`], which answers existence, content and match queries over
//! a [`FileSystemSource`] and memoises what it has already seen.

pub mod file_inspector;
pub mod local_fs;
pub mod matcher;
pub mod virtual_fs;

pub use file_inspector::{CachedFileInspector, FileMatches};
pub use local_fs::LocalFileSystem;
pub use matcher::{extension_of, FileMatcher};
pub use virtual_fs::{FileSystemNode, VirtualFileSystem};

use thiserror::Error;

/// Errors raised while inspecting a file tree.
#[derive(Error, Debug)]
pub enum InspectorError {
    /// The requested path does not exist (or is a directory).
    #[error("File not found: {0}")]
    NotFound(String),

    /// The backing file system failed.
    #[error("I/O error while reading {path}: {source}")]
    Io {
        /// Path being read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A glob pattern could not be compiled.
    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },
}

/// Backing store of an inspector: a flat listing plus content lookup.
pub trait FileSystemSource: Send + Sync {
    /// Returns every file path, relative to the root, `/`-separated.
    fn list_files(&self) -> Result<Vec<String>, InspectorError>;

    /// Returns the content of a file, or `None` if it does not exist.
    fn read(&self, path: &str) -> Result<Option<String>, InspectorError>;
}

/// Queryable, read-only view over a repository's files.
pub trait FileInspector: Send + Sync {
    /// Returns whether a file exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Returns the content of the file at `path`.
    fn read_file(&self, path: &str) -> Result<String, InspectorError>;

    /// Lazily yields every file path accepted by `matcher`, in sorted order.
    ///
    /// Each call starts a fresh iteration over the cached listing.
    fn find_files<'m>(&self, matcher: &'m FileMatcher) -> Result<FileMatches<'m>, InspectorError>;

    /// Drops every cached listing and content entry.
    fn purge_cache(&self);
}

/// Normalizes a user-supplied path to the inspector's canonical form.
///
/// Backslashes become `/`, `.` segments and leading/trailing separators are
/// dropped. `..` segments are kept so sources can reject them.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
