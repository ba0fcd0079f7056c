//! On-disk CLI configuration (`<config_dir>/votenow/config.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use votenow_client::ClientConfig;

const APP_DIR: &str = "votenow";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API base URL; overridden by `--base-url` / `VOTENOW_API_BASE_URL`.
    pub base_url: Option<String>,

    pub timeout_secs: Option<u64>,

    /// Where the login session is kept.
    pub session_file: Option<PathBuf>,
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("could not determine the configuration directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location. A missing file yields
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Session file path: explicit override, then config, then the data dir.
    pub fn session_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit.or(self.session_file.as_deref()) {
            return Ok(path.to_path_buf());
        }
        let dir = dirs::data_local_dir().context("could not determine the data directory")?;
        Ok(dir.join(APP_DIR).join(SESSION_FILE))
    }

    /// Layer this file over the environment defaults, then apply flags.
    pub fn client_config(&self, base_url: Option<&str>, timeout_secs: Option<u64>) -> ClientConfig {
        let mut config = ClientConfig::from_env();

        if let Some(url) = base_url.or(self.base_url.as_deref()) {
            config.base_url = url.to_string();
        }
        if let Some(secs) = timeout_secs.or(self.timeout_secs) {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "base_url = \"https://polls.example.com/api\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://polls.example.com/api"));
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = AppConfig {
            base_url: Some("https://file.example.com/api".into()),
            timeout_secs: Some(5),
            session_file: None,
        };

        let client = config.client_config(Some("https://flag.example.com/api"), None);
        assert_eq!(client.base_url, "https://flag.example.com/api");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_session_path_precedence() {
        let config = AppConfig {
            session_file: Some(PathBuf::from("/tmp/from-config.json")),
            ..Default::default()
        };
        assert_eq!(
            config.session_path(Some(Path::new("/tmp/flag.json"))).unwrap(),
            PathBuf::from("/tmp/flag.json")
        );
        assert_eq!(
            config.session_path(None).unwrap(),
            PathBuf::from("/tmp/from-config.json")
        );
    }
}
