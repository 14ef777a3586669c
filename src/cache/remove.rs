//! Entry removal.

use std::fs;
use std::io;
use std::path::Path;

use super::Cache;
use crate::error::Result;
use crate::key::CacheKey;

impl Cache {
    /// Deletes the entry for `url`. Not cached is a no-op; only a failing
    /// delete is an error.
    pub fn remove(&self, url: &str) -> Result<()> {
        let key = CacheKey::derive(url);
        for path in self.matching_files(&key)? {
            remove_entry_file(&path)?;
        }
        Ok(())
    }

    /// Deletes every entry and returns how many were removed. Files that are
    /// not cache entries are left alone.
    pub fn remove_all(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in self.entries()? {
            if remove_entry_file(&entry.path)? {
                removed += 1;
            }
        }
        tracing::info!(dir = %self.dir.display(), removed, "cleared download cache");
        Ok(removed)
    }
}

/// Returns whether the file was there to delete.
fn remove_entry_file(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "deleted cache entry");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
