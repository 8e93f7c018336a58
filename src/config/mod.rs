use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable that overrides `api.token`.
pub const TOKEN_ENV: &str = "MINUTES_API_TOKEN";

const APP_DIR: &str = "minutes";

/// `<config_dir>/minutes/config.toml`
pub fn config_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join("config.toml"))
        .context("Unable to determine config directory")
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the minutes backend (proxy)
    pub base_url: String,
    /// Bearer token issued by the identity provider
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay between status checks while a job is queued or processing
    pub poll_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl ApiConfig {
    /// Token from the environment if set, otherwise from the config file.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = config_file()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert!(config.api.token.is_none());
        assert_eq!(config.sync.poll_interval(), Duration::from_millis(3000));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://minutes.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://minutes.example.com");
        assert_eq!(config.sync.poll_interval_ms, 3000);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sync.poll_interval_ms = 500;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sync.poll_interval_ms, 500);
        assert_eq!(loaded.api.base_url, config.api.base_url);
    }

    #[test]
    fn test_config_file_location() {
        if let Ok(path) = config_file() {
            assert!(path.ends_with("minutes/config.toml"));
        }
    }

    #[test]
    fn test_zero_interval_clamped() {
        let sync = SyncConfig { poll_interval_ms: 0 };
        assert_eq!(sync.poll_interval(), Duration::from_millis(1));
    }
}
