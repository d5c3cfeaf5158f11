use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Fallback base address when neither the env var nor the config file sets one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Base address resolution order: `RAGCHAT_API_URL`, then the config
    /// file, then the compiled default.
    pub fn resolve_api_url(&self) -> String {
        std::env::var("RAGCHAT_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Log file lives next to the config because the terminal itself is
    /// owned by the TUI.
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("ragchat.log"))
    }

    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ragchat"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn reads_the_saved_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_url":"https://rag.example.com"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://rag.example.com"));
    }

    #[test]
    fn garbled_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
