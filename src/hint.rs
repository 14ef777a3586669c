//! Naming hints: the optional, human-readable suffix of a cache file name.
//!
//! A hint such as `"cheesy.zip"` turns `<key>` into `<key>-cheesy.zip`, so
//! tools that look at extensions keep working on cached files.

use crate::key::KEY_LEN;

/// Separator between key and hint in a cache file name.
pub const SEPARATOR: char = '-';

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Longest hint (in bytes) that still fits `<key>-<hint>` into NAME_MAX.
pub const MAX_HINT_LEN: usize = NAME_MAX - KEY_LEN - 1;

/// Reduces a caller-supplied hint to a single safe file name component.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Trims surrounding whitespace
/// - Keeps the tail when over [`MAX_HINT_LEN`] bytes, so the extension survives
///
/// Everything else, dots included, is kept as given. Returns `None` when
/// nothing usable is left.
pub fn sanitize_hint(hint: &str) -> Option<String> {
    let replaced: String = hint
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return None;
    }

    if trimmed.len() > MAX_HINT_LEN {
        let mut start = trimmed.len() - MAX_HINT_LEN;
        while !trimmed.is_char_boundary(start) {
            start += 1;
        }
        Some(trimmed[start..].to_string())
    } else {
        Some(trimmed.to_string())
    }
}

/// On-disk file name for `key` with an optional hint.
pub fn entry_file_name(key: &str, hint: Option<&str>) -> String {
    match hint.and_then(sanitize_hint) {
        Some(h) => format!("{key}{SEPARATOR}{h}"),
        None => key.to_string(),
    }
}
