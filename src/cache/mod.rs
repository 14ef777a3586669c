//! The cache handle: a validated directory plus the store, lookup and
//! removal operations on it.
//!
//! Layout is a single flat directory. Every entry is one file named `<key>` or
//! `<key>-<hint>`; there is no index or sidecar, the directory listing is the
//! whole persisted state. In-flight stores stage their content in
//! `.<key>.part`, which never matches a key prefix.

mod lookup;
mod remove;
mod store;

pub use lookup::{CacheEntry, SizeInfo};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::key::CacheKey;

/// Temporary file suffix used before the atomic rename into place.
pub const TEMP_SUFFIX: &str = ".part";

/// URL-keyed cache over an existing directory. Cheap to clone; holds no
/// state besides the directory path, so clones and other processes see the
/// same entries.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: Arc<Path>,
    verify_after_store: bool,
}

impl Cache {
    /// Opens the cache over `dir`, which must already exist as a directory.
    /// The directory is never created here.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        match fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(directory_not_found(dir)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(directory_not_found(dir)),
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(dir = %dir.display(), "opened download cache");
        Ok(Cache {
            dir: Arc::from(dir),
            verify_after_store: false,
        })
    }

    /// Opens the cache described by `cfg` (explicit `cache_dir` or the XDG
    /// cache home). The directory must already exist.
    pub fn open_with(cfg: &CacheConfig) -> anyhow::Result<Self> {
        let dir = cfg.resolved_cache_dir()?;
        let cache = Cache::open(&dir)?.with_verification(cfg.verify_after_store);
        Ok(cache)
    }

    /// When enabled, every store re-hashes the staged copy and compares it
    /// with the source before it becomes visible.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_after_store = verify;
        self
    }

    /// The directory this cache was opened over, exactly as given.
    pub fn cache_path(&self) -> &Path {
        &self.dir
    }

    /// Full path an entry for `key` would have with the given file name.
    fn entry_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Staging path for an in-progress store of `key`.
    fn temp_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!(".{key}{TEMP_SUFFIX}"))
    }
}

fn directory_not_found(dir: &Path) -> CacheError {
    CacheError::DirectoryNotFound {
        path: dir.to_path_buf(),
    }
}
