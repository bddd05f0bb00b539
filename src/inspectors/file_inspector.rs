//! Caching [`FileInspector`] over any [`FileSystemSource`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use super::{normalize_path, FileInspector, FileMatcher, FileSystemSource, InspectorError};

/// Lazy iterator over the paths of a cached listing accepted by a matcher.
pub struct FileMatches<'m> {
    listing: Arc<Vec<String>>,
    matcher: &'m FileMatcher,
    index: usize,
}

impl Iterator for FileMatches<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(path) = self.listing.get(self.index) {
            self.index += 1;
            if self.matcher.matches(path) {
                return Some(path.clone());
            }
        }
        None
    }
}

/// File inspector that memoises listings and file contents.
///
/// Entries are keyed by normalized path and written at most once until
/// [`purge_cache`](FileInspector::purge_cache). Concurrent misses on the same
/// key read the same source twice and store the same value, so readers never
/// observe an inconsistent entry.
pub struct CachedFileInspector<S> {
    source: Arc<S>,
    listing: RwLock<Option<Arc<Vec<String>>>>,
    contents: RwLock<HashMap<String, Option<String>>>,
}

impl<S: FileSystemSource> CachedFileInspector<S> {
    /// Creates an inspector over a shared source.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            listing: RwLock::new(None),
            contents: RwLock::new(HashMap::new()),
        }
    }

    /// The backing source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    fn listing(&self) -> Result<Arc<Vec<String>>, InspectorError> {
        if let Some(listing) = self
            .listing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(listing));
        }

        let mut files = self.source.list_files()?;
        files.sort();
        let files = Arc::new(files);
        debug!(files = files.len(), "Cached file listing");
        *self.listing.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&files));
        Ok(files)
    }

    fn content(&self, path: &str) -> Result<Option<String>, InspectorError> {
        let key = normalize_path(path);
        if let Some(cached) = self
            .contents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(cached.clone());
        }

        let content = self.source.read(&key)?;
        self.contents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| content.clone());
        Ok(content)
    }
}

impl<S: FileSystemSource> FileInspector for CachedFileInspector<S> {
    fn exists(&self, path: &str) -> bool {
        match self.content(path) {
            Ok(content) => content.is_some(),
            Err(e) => {
                warn!(path, error = %e, "Failed to check file existence");
                false
            }
        }
    }

    fn read_file(&self, path: &str) -> Result<String, InspectorError> {
        self.content(path)?
            .ok_or_else(|| InspectorError::NotFound(normalize_path(path)))
    }

    fn find_files<'m>(&self, matcher: &'m FileMatcher) -> Result<FileMatches<'m>, InspectorError> {
        Ok(FileMatches {
            listing: self.listing()?,
            matcher,
            index: 0,
        })
    }

    fn purge_cache(&self) {
        *self.listing.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.contents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("Purged file inspector cache");
    }
}
