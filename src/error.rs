//! Error type for cache operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by every cache operation.
pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory handed to `Cache::open` does not exist or is not a
    /// directory. `path` is the caller's input, unmodified.
    #[error("cache directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Underlying filesystem failure, passed through as-is.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// More than one file in the cache directory carries the same key. Only
    /// happens when something other than the cache wrote into the directory.
    #[error("ambiguous cache entry for key {key}: {} matching files", matches.len())]
    AmbiguousEntry { key: String, matches: Vec<PathBuf> },

    /// Post-store verification found the staged copy differs from the source.
    #[error("cache entry {} does not match its source (expected sha256 {expected}, got {actual})", path.display())]
    VerifyFailed {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl CacheError {
    /// True for an I/O error of kind `NotFound` (e.g. a missing source file on store).
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
