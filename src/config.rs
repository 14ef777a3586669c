use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Cache configuration loaded from `~/.config/dlcache/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory. When unset, `$XDG_CACHE_HOME/dlcache` is used.
    /// Must exist; the cache never creates it.
    pub cache_dir: Option<PathBuf>,
    /// Re-hash each stored entry and compare with its source before it
    /// becomes visible.
    pub verify_after_store: bool,
}

impl CacheConfig {
    /// The directory the cache should be opened over.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        default_cache_dir()
    }
}

/// `$XDG_CACHE_HOME/dlcache` (usually `~/.cache/dlcache`).
pub fn default_cache_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlcache")?;
    Ok(xdg_dirs.get_cache_home().join("dlcache"))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlcache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CacheConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from a specific file.
pub fn load_from(path: &Path) -> Result<CacheConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: CacheConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = CacheConfig::default();
        assert!(cfg.cache_dir.is_none());
        assert!(!cfg.verify_after_store);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = CacheConfig {
            cache_dir: Some(PathBuf::from("/var/cache/pkgs")),
            verify_after_store: true,
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CacheConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.cache_dir, cfg.cache_dir);
        assert!(parsed.verify_after_store);
    }

    #[test]
    fn config_toml_empty_uses_defaults() {
        let cfg: CacheConfig = toml::from_str("").unwrap();
        assert!(cfg.cache_dir.is_none());
        assert!(!cfg.verify_after_store);
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let toml = r#"
            cache_dir = "/srv/downloads/cache"
        "#;
        let cfg: CacheConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            cfg.resolved_cache_dir().unwrap(),
            PathBuf::from("/srv/downloads/cache")
        );
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "verify_after_store = true\n").unwrap();
        let cfg = load_from(&path).unwrap();
        assert!(cfg.verify_after_store);
        assert!(cfg.cache_dir.is_none());
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "verify_after_store = \"maybe\"\n").unwrap();
        assert!(load_from(&path).is_err());
    }
}
