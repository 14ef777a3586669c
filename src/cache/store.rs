//! Entry store: stage the new content, drop stale entries, rename into place.
//!
//! Ordering per store:
//! 1. copy (or move) the source into `.<key>.part`
//! 2. optionally verify the staged bytes against the source
//! 3. delete every other file owned by the key
//! 4. rename the staged file to `<key>[-<hint>]`
//!
//! Between 3 and 4 a lookup sees no entry; it never sees two. A failure after 3
//! leaves the key uncached, and the removed entries are not restored.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use super::Cache;
use crate::checksum::sha256_path;
use crate::error::{CacheError, Result};
use crate::hint::entry_file_name;
use crate::key::CacheKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Copy,
    Move,
}

impl Cache {
    /// Copies `source` into the cache as the entry for `url`, replacing any
    /// previous entry. The source file is left untouched. Returns the path of
    /// the new entry.
    pub fn store(&self, url: &str, source: &Path, hint: Option<&str>) -> Result<PathBuf> {
        self.store_with(url, source, hint, Transfer::Copy)
    }

    /// Like [`Cache::store`], but moves `source` into the cache instead of
    /// copying it. Falls back to copy-then-delete when a rename is not possible
    /// (e.g. across filesystems).
    pub fn store_moved(&self, url: &str, source: &Path, hint: Option<&str>) -> Result<PathBuf> {
        self.store_with(url, source, hint, Transfer::Move)
    }

    fn store_with(
        &self,
        url: &str,
        source: &Path,
        hint: Option<&str>,
        transfer: Transfer,
    ) -> Result<PathBuf> {
        let key = CacheKey::derive(url);
        let file_name = entry_file_name(key.as_str(), hint);
        let target = self.entry_path(&file_name);
        let temp = self.temp_path(&key);

        let expected = if self.verify_after_store {
            Some(sha256_path(source)?)
        } else {
            None
        };

        match transfer {
            Transfer::Copy => copy_to(source, &temp)?,
            Transfer::Move => move_to(source, &temp)?,
        }

        if let Err(e) = self.finish_store(&key, &file_name, &temp, &target, expected) {
            match transfer {
                Transfer::Copy => discard_temp(&temp),
                Transfer::Move => hand_back(&temp, source),
            }
            return Err(e);
        }

        tracing::debug!(
            url,
            key = %key,
            entry = %target.display(),
            moved = transfer == Transfer::Move,
            "stored cache entry"
        );
        Ok(target)
    }

    fn finish_store(
        &self,
        key: &CacheKey,
        file_name: &str,
        temp: &Path,
        target: &Path,
        expected: Option<String>,
    ) -> Result<()> {
        if let Some(expected) = expected {
            let actual = sha256_path(temp)?;
            if actual != expected {
                return Err(CacheError::VerifyFailed {
                    path: target.to_path_buf(),
                    expected,
                    actual,
                });
            }
        }

        // A same-named entry is replaced by the rename itself.
        for stale in self.matching_files(key)? {
            if stale.file_name().and_then(|n| n.to_str()) == Some(file_name) {
                continue;
            }
            match fs::remove_file(&stale) {
                Ok(()) => tracing::debug!(path = %stale.display(), "removed superseded entry"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        fs::rename(temp, target)?;
        Ok(())
    }
}

/// Copies `source` to `dest` (truncating) and syncs it to disk. A partly
/// written `dest` is removed again on failure.
fn copy_to(source: &Path, dest: &Path) -> io::Result<()> {
    let mut src = File::open(source)?;
    let mut out = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)?;
    let copied = io::copy(&mut src, &mut out).and_then(|_| out.sync_all());
    if copied.is_err() {
        drop(out);
        discard_temp(dest);
    }
    copied
}

fn move_to(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::debug!(
                source = %source.display(),
                "rename into cache failed ({}), copying instead",
                e
            );
            copy_to(source, dest)?;
            fs::remove_file(source)
        }
    }
}

/// Returns a moved-in source to the caller after a failed store.
fn hand_back(temp: &Path, source: &Path) {
    let restored = fs::rename(temp, source).or_else(|e| {
        tracing::debug!(source = %source.display(), "rename back failed ({}), copying instead", e);
        copy_to(temp, source)?;
        fs::remove_file(temp)
    });
    if let Err(e) = restored {
        tracing::warn!(
            source = %source.display(),
            staged = %temp.display(),
            "could not return source after failed store: {}",
            e
        );
    }
}

fn discard_temp(temp: &Path) {
    match fs::remove_file(temp) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %temp.display(), "could not remove staged file: {}", e),
    }
}
