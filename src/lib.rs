//! dlcache: a URL-keyed, on-disk cache of downloaded files.
//!
//! Each URL maps to at most one file in a flat cache directory, named after a
//! SHA-256 key of the URL plus an optional human-readable hint suffix.

pub mod cache;
pub mod checksum;
pub mod config;
pub mod error;
pub mod hint;
pub mod key;
pub mod logging;

pub use cache::{Cache, CacheEntry, SizeInfo};
pub use error::{CacheError, Result};
pub use key::CacheKey;
