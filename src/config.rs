// Configuration: resolves the base URL of the conversion server from the
// command line, the environment or a small JSON file in the user's config
// directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Used when nothing else is configured (Flask's development port).
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Environment variable that overrides the config file.
pub const SERVER_URL_ENV: &str = "DOCPDF_SERVER_URL";

/// Persisted settings, stored as `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the conversion server, without the `/upload` suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

/// `<config_dir>/docpdf/config.json`, e.g. `~/.config/docpdf/config.json`.
pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Failed to locate the user config directory")?;
    Ok(dir.join("docpdf").join("config.json"))
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Pick the server URL: flag, then environment, then file, then default.
    pub fn server_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        let url = [flag, env, self.server_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_SERVER_URL);
        normalize_url(url)
    }
}

/// Resolve the server URL for a command. The config file at `path` is only
/// read when neither the flag nor the environment names a server, and a file
/// that cannot be loaded is skipped with a warning.
pub fn resolve_server_url(path: Option<&Path>, flag: Option<&str>, env: Option<&str>) -> String {
    fn given(v: Option<&str>) -> Option<&str> {
        v.filter(|u| !u.trim().is_empty())
    }
    if given(flag).is_some() || given(env).is_some() {
        return Config::default().server_url(flag, env);
    }
    let cfg = match path.map(Config::load_from) {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!(error = %format!("{:#}", e), "ignoring unusable config file");
            Config::default()
        }
        None => Config::default(),
    };
    cfg.server_url(None, None)
}

/// Trim whitespace and trailing slashes so `{base}/upload` is well formed.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = Config { server_url: Some("http://convert.local:8080".into()) };
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn server_url_precedence() {
        let cfg = Config { server_url: Some("http://file:1/".into()) };
        assert_eq!(cfg.server_url(Some("http://flag:1"), Some("http://env:1")), "http://flag:1");
        assert_eq!(cfg.server_url(None, Some("http://env:1//")), "http://env:1");
        assert_eq!(cfg.server_url(None, None), "http://file:1");
        assert_eq!(Config::default().server_url(None, None), DEFAULT_SERVER_URL);
        assert_eq!(Config::default().server_url(None, Some("  ")), DEFAULT_SERVER_URL);
        assert_eq!(cfg.server_url(Some(" "), Some("http://env:1")), "http://env:1");
    }

    #[test]
    fn malformed_file_can_be_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let cfg = Config { server_url: Some("http://x:1".into()) };
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_does_not_block_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            resolve_server_url(Some(&path), Some("http://flag:1/"), None),
            "http://flag:1"
        );
        assert_eq!(
            resolve_server_url(Some(&path), None, Some("http://env:1")),
            "http://env:1"
        );
        assert_eq!(resolve_server_url(Some(&path), None, None), DEFAULT_SERVER_URL);
    }

    #[test]
    fn resolution_reads_file_when_nothing_else_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config { server_url: Some("http://file:1".into()) }.save_to(&path).unwrap();
        assert_eq!(resolve_server_url(Some(&path), None, None), "http://file:1");
        assert_eq!(resolve_server_url(None, None, None), DEFAULT_SERVER_URL);
    }
}
