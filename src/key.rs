//! Cache key derivation.
//!
//! A key is the SHA-256 of the URL's UTF-8 bytes as 64 lowercase hex
//! characters. The URL is hashed verbatim; it is never parsed or normalized,
//! so `http://example.com` and `http://example.com/` are different keys.

use std::fmt;

use crate::checksum::sha256_hex;

/// Length of a key in hex characters.
pub const KEY_LEN: usize = 64;

/// Stable on-disk filename stem for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `url`.
    pub fn derive(url: &str) -> Self {
        CacheKey(sha256_hex(url.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `file_name` belongs to this key: exactly the key, or the key
    /// followed by the hint separator.
    pub fn owns(&self, file_name: &str) -> bool {
        match file_name.strip_prefix(self.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(crate::hint::SEPARATOR),
            None => false,
        }
    }

    /// Splits a cache file name into its key and optional hint suffix.
    /// Returns `None` for names that do not start with a key-shaped stem.
    pub fn parse_file_name(file_name: &str) -> Option<(CacheKey, Option<&str>)> {
        let stem = file_name.get(..KEY_LEN)?;
        if !stem
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return None;
        }
        let rest = &file_name[KEY_LEN..];
        let hint = if rest.is_empty() {
            None
        } else {
            Some(rest.strip_prefix(crate::hint::SEPARATOR)?)
        };
        Some((CacheKey(stem.to_string()), hint))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
