//! File-based cache implementation.
//!
//! [`FileCache`] stores cache entries as plain files on disk, organized into
//! buckets (subdirectories). The entry's age is the age of its file's
//! modification time, so a cached JSON document stays directly readable by
//! other tools.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::{Cache, CacheBucket};

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- notebooks/                # bucket "notebooks"
///     +-- 3q2-7wEjg....json     # cache entry
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a file-based cache rooted at `root`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of this cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove every bucket and entry.
    ///
    /// Returns `Ok(false)` if there was nothing to remove.
    pub fn clear(&self) -> io::Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.root)?;
        tracing::info!(root = %self.root.display(), "cache cleared");
        Ok(true)
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, max_age: Option<Duration>) -> Option<Vec<u8>> {
        let path = self.dir.join(key);
        let metadata = fs::metadata(&path).ok()?;

        if let Some(max_age) = max_age {
            let age = entry_age(&metadata);
            if age >= max_age {
                tracing::debug!(path = %path.display(), age_secs = age.as_secs(), "cache entry stale");
                return None;
            }
        }

        fs::read(&path).ok()
    }

    fn set(&self, key: &str, value: &[u8]) {
        let path = self.dir.join(key);

        // Silently ignore errors, the cache is optional
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::debug!(error = %e, "Failed to create cache directory");
            return;
        }
        if let Err(e) = fs::write(&path, value) {
            tracing::debug!(path = %path.display(), error = %e, "Failed to write cache entry");
        }
    }
}

/// Age of a cache entry. Modification times in the future count as fresh.
fn entry_age(metadata: &fs::Metadata) -> Duration {
    metadata
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .unwrap_or_default()
}
