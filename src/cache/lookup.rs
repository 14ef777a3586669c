//! Entry lookup. Every call re-reads the directory.

use std::fs;
use std::path::PathBuf;

use super::Cache;
use crate::checksum::sha256_path;
use crate::error::{CacheError, Result};
use crate::key::CacheKey;

/// One cached file, as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// Hint suffix after the separator, if the entry has one.
    pub hint: Option<String>,
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

/// Totals over all entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeInfo {
    pub files: usize,
    pub bytes: u64,
}

impl Cache {
    /// True if an entry exists for `url`.
    pub fn is_cached(&self, url: &str) -> Result<bool> {
        let key = CacheKey::derive(url);
        Ok(!self.matching_files(&key)?.is_empty())
    }

    /// Full path of the entry for `url`, or `None` if it is not cached.
    ///
    /// Fails with [`CacheError::AmbiguousEntry`] when more than one file
    /// carries the key; the next `store` or `remove` for the URL clears that up.
    pub fn cached_filename(&self, url: &str) -> Result<Option<PathBuf>> {
        let key = CacheKey::derive(url);
        let mut matches = self.matching_files(&key)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => {
                tracing::warn!(url, key = %key, count = n, "multiple cache files for one key");
                Err(CacheError::AmbiguousEntry {
                    key: key.to_string(),
                    matches,
                })
            }
        }
    }

    /// SHA-256 (lowercase hex) of the cached file for `url`, if cached.
    pub fn checksum(&self, url: &str) -> Result<Option<String>> {
        match self.cached_filename(url)? {
            Some(path) => Ok(Some(sha256_path(&path)?)),
            None => Ok(None),
        }
    }

    /// All entries in the cache, sorted by file name. Staging files and files
    /// without a key-shaped name are skipped.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut out = Vec::new();
        for dirent in fs::read_dir(&self.dir)? {
            let dirent = dirent?;
            let meta = dirent.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let name = dirent.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some((key, hint)) = CacheKey::parse_file_name(name) else {
                continue;
            };
            out.push(CacheEntry {
                key,
                hint: hint.map(str::to_string),
                path: dirent.path(),
                size: meta.len(),
            });
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    /// Number of entries and their total size.
    pub fn size_info(&self) -> Result<SizeInfo> {
        let entries = self.entries()?;
        Ok(SizeInfo {
            files: entries.len(),
            bytes: entries.iter().map(|e| e.size).sum(),
        })
    }

    /// Paths of regular files owned by `key`, sorted.
    pub(super) fn matching_files(&self, key: &CacheKey) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for dirent in fs::read_dir(&self.dir)? {
            let dirent = dirent?;
            let owned = dirent.file_name().to_str().is_some_and(|n| key.owns(n));
            if owned && dirent.file_type()?.is_file() {
                out.push(dirent.path());
            }
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "http://example.com/";

    fn setup() -> (TempDir, Cache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        (dir, cache)
    }

    #[test]
    fn fresh_cache_has_nothing() {
        let (_dir, cache) = setup();
        assert!(!cache.is_cached(URL).unwrap());
        assert_eq!(cache.cached_filename(URL).unwrap(), None);
        assert_eq!(cache.checksum(URL).unwrap(), None);
        assert!(cache.entries().unwrap().is_empty());
        assert_eq!(cache.size_info().unwrap(), SizeInfo::default());
    }

    #[test]
    fn externally_dropped_duplicate_is_ambiguous() {
        let (dir, cache) = setup();
        let key = CacheKey::derive(URL);
        fs::write(dir.path().join(format!("{key}-a.zip")), b"a").unwrap();
        fs::write(dir.path().join(format!("{key}-b.zip")), b"b").unwrap();

        assert!(cache.is_cached(URL).unwrap());
        match cache.cached_filename(URL) {
            Err(CacheError::AmbiguousEntry { key: k, matches }) => {
                assert_eq!(k, key.to_string());
                assert_eq!(matches.len(), 2);
                assert!(matches[0] < matches[1]);
            }
            other => panic!("expected AmbiguousEntry, got {other:?}"),
        }
    }

    #[test]
    fn foreign_files_and_directories_ignored() {
        let (dir, cache) = setup();
        let key = CacheKey::derive(URL);
        fs::write(dir.path().join("README"), b"hi").unwrap();
        fs::write(dir.path().join(format!(".{key}.part")), b"half").unwrap();
        fs::create_dir(dir.path().join(format!("{key}-dir"))).unwrap();

        assert!(!cache.is_cached(URL).unwrap());
        assert!(cache.entries().unwrap().is_empty());
    }

    #[test]
    fn entries_and_size_info() {
        let (dir, cache) = setup();
        let src = dir.path().join("src.bin");
        fs::write(&src, b"12345").unwrap();
        cache.store("http://a.example/", &src, Some("a.zip")).unwrap();
        cache.store("http://b.example/", &src, None).unwrap();
        fs::remove_file(&src).unwrap();

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 2);
        let a = entries
            .iter()
            .find(|e| e.key == CacheKey::derive("http://a.example/"))
            .unwrap();
        assert_eq!(a.hint.as_deref(), Some("a.zip"));
        assert_eq!(a.size, 5);
        let b = entries
            .iter()
            .find(|e| e.key == CacheKey::derive("http://b.example/"))
            .unwrap();
        assert_eq!(b.hint, None);

        assert_eq!(cache.size_info().unwrap(), SizeInfo { files: 2, bytes: 10 });
    }

    #[test]
    fn checksum_of_cached_entry() {
        let (dir, cache) = setup();
        let src = dir.path().join("src.bin");
        fs::write(&src, b"hello\n").unwrap();
        cache.store(URL, &src, None).unwrap();
        assert_eq!(
            cache.checksum(URL).unwrap().as_deref(),
            Some("5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03")
        );
    }
}
