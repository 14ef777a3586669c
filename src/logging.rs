//! Tracing setup for hosts embedding the cache: a log file under the XDG
//! state dir, or stderr when that is not writable.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,dlcache=debug";
const LOG_FILE_NAME: &str = "dlcache.log";

/// `RUST_LOG` if set and valid, else `info,dlcache=debug`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global fmt subscriber writing to `writer`, without ANSI colors.
fn install<W>(writer: W) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Opens (appending) the log file inside `log_dir`, creating the dir if needed.
fn open_log_file(log_dir: &Path) -> Result<(PathBuf, fs::File)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("create log dir {}", log_dir.display()))?;
    let path = log_dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    Ok((path, file))
}

/// Log to `~/.local/state/dlcache/dlcache.log`. Returns the log file path.
/// An Err leaves no subscriber installed; call [`init_logging_stderr`] then.
pub fn init_logging() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlcache")?;
    init_logging_in(&xdg_dirs.get_state_home().join("dlcache"))
}

/// Like [`init_logging`], with an explicit log directory.
pub fn init_logging_in(log_dir: &Path) -> Result<PathBuf> {
    let (path, file) = open_log_file(log_dir)?;
    install(Mutex::new(file))?;
    tracing::info!(log = %path.display(), "dlcache logging initialized");
    Ok(path)
}

/// Stderr-only logging. A subscriber that is already installed is kept.
pub fn init_logging_stderr() {
    let _ = install(io::stderr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_opened_for_append() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("state/dlcache");

        let (path, mut file) = open_log_file(&log_dir).unwrap();
        assert_eq!(path, log_dir.join(LOG_FILE_NAME));
        file.write_all(b"first\n").unwrap();
        drop(file);

        let (_, mut file) = open_log_file(&log_dir).unwrap();
        file.write_all(b"second\n").unwrap();
        drop(file);

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn log_dir_that_is_a_file_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = open_log_file(&file.path().join("sub")).unwrap_err();
        assert!(err.to_string().starts_with("create log dir"));
    }

    #[test]
    fn init_logging_in_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("state");
        // The global subscriber may already be taken by another test; the
        // file is opened before installing either way.
        let _ = init_logging_in(&log_dir);
        assert!(log_dir.join(LOG_FILE_NAME).exists());
    }
}
