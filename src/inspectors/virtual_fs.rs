//! In-memory file tree used by tests and by callers that already hold
//! repository content (e.g. fetched through a provider API).

use std::sync::{PoisonError, RwLock};

use super::{normalize_path, FileSystemSource, InspectorError};

/// A node of an in-memory file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemNode {
    /// A directory with ordered, uniquely named children.
    Directory {
        /// Directory name (empty for the root).
        name: String,
        /// Child nodes in insertion order.
        children: Vec<FileSystemNode>,
    },
    /// A file with text content.
    File {
        /// File name.
        name: String,
        /// File content.
        content: String,
    },
}

impl FileSystemNode {
    /// Creates an empty root directory.
    pub fn root() -> Self {
        Self::Directory {
            name: String::new(),
            children: Vec::new(),
        }
    }

    /// Name of the node.
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Inserts (or replaces) the file at `path`, creating intermediate
    /// directories. A file standing where a directory is needed is replaced.
    pub fn insert_file(&mut self, path: &str, content: impl Into<String>) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return;
        }
        self.insert_segments(&segments, content.into());
    }

    fn insert_segments(&mut self, segments: &[&str], content: String) {
        let Self::Directory { children, .. } = self else {
            return;
        };
        let (head, rest) = (segments[0], &segments[1..]);
        let position = children.iter().position(|c| c.name() == head);

        if rest.is_empty() {
            let file = Self::File {
                name: head.to_string(),
                content,
            };
            match position {
                Some(i) => children[i] = file,
                None => children.push(file),
            }
            return;
        }

        let index = match position {
            Some(i) if matches!(children[i], Self::Directory { .. }) => i,
            Some(i) => {
                children[i] = Self::Directory {
                    name: head.to_string(),
                    children: Vec::new(),
                };
                i
            }
            None => {
                children.push(Self::Directory {
                    name: head.to_string(),
                    children: Vec::new(),
                });
                children.len() - 1
            }
        };
        children[index].insert_segments(rest, content);
    }

    /// Looks up the node at `path` (relative to this node).
    pub fn find(&self, path: &str) -> Option<&Self> {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let Self::Directory { children, .. } = node else {
                return None;
            };
            node = children.iter().find(|c| c.name() == segment)?;
        }
        Some(node)
    }

    /// Collects the paths of every file below this node.
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        match self {
            Self::File { name, .. } => paths.push(join(prefix, name)),
            Self::Directory { name, children } => {
                let prefix = join(prefix, name);
                for child in children {
                    child.collect_paths(&prefix, paths);
                }
            }
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{name}"),
    }
}

/// Replaceable in-memory file system.
///
/// Replacing the tree does not invalidate inspectors built on top of it;
/// callers must `purge_cache` them.
#[derive(Debug)]
pub struct VirtualFileSystem {
    root: RwLock<FileSystemNode>,
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self {
            root: RwLock::new(FileSystemNode::root()),
        }
    }
}

impl VirtualFileSystem {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a file system from `(path, content)` pairs.
    pub fn from_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let fs = Self::new();
        fs.set_file_system(files);
        fs
    }

    /// Replaces the whole tree with the given `(path, content)` pairs.
    pub fn set_file_system<I, P, C>(&self, files: I)
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut root = FileSystemNode::root();
        for (path, content) in files {
            root.insert_file(&normalize_path(path.as_ref()), content);
        }
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = root;
    }

    /// Empties the tree.
    pub fn clear_file_system(&self) {
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = FileSystemNode::root();
    }
}

impl FileSystemSource for VirtualFileSystem {
    fn list_files(&self) -> Result<Vec<String>, InspectorError> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        Ok(root.file_paths())
    }

    fn read(&self, path: &str) -> Result<Option<String>, InspectorError> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        Ok(match root.find(&normalize_path(path)) {
            Some(FileSystemNode::File { content, .. }) => Some(content.clone()),
            _ => None,
        })
    }
}
