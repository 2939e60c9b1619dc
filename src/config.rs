//! Configuration loading and persistence.
//!
//! Settings live in `config.json` inside the config directory. Environment
//! variables override the file; CLI flags (applied by `main`) override both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::constants::DEFAULT_RELAY_URL;
use crate::ws::normalize_relay_url;

/// Keys accepted by [`Config::set_key`].
pub const CONFIG_KEYS: &[&str] = &["relay_url", "username", "message_log_limit"];

/// Configuration for the roomchat client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// WebSocket URL of the chat relay.
    pub relay_url: String,
    /// Username pre-filled in the lobby.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Maximum retained log entries; unbounded when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_log_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            username: None,
            message_log_limit: None,
        }
    }
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// `ROOMCHAT_CONFIG_DIR` wins; otherwise the platform config dir
    /// (e.g. `~/.config/roomchat` on Linux).
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(dir) = std::env::var("ROOMCHAT_CONFIG_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("roomchat")
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config dir {}", dir.display()))?;
        Ok(dir)
    }

    /// Path of the config file inside [`Config::config_dir`].
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Where the log file goes: `ROOMCHAT_LOG_FILE`, else next to the config.
    pub fn log_file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("ROOMCHAT_LOG_FILE") {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("roomchat.log"))
    }

    /// Loads configuration from file, with environment variable overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config {}: {e:#}", path.display());
            Self::default()
        });
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.relay_url = normalize_relay_url(&config.relay_url);
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `ROOMCHAT_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("ROOMCHAT_RELAY_URL") {
            self.relay_url = normalize_relay_url(&url);
        }

        if let Some(username) = lookup("ROOMCHAT_USERNAME") {
            self.username = Some(username).filter(|u| !u.trim().is_empty());
        }

        if let Some(limit) = lookup("ROOMCHAT_LOG_LIMIT") {
            match limit.parse::<usize>() {
                Ok(limit) => self.message_log_limit = Some(limit).filter(|&n| n > 0),
                Err(_) => log::warn!("Ignoring ROOMCHAT_LOG_LIMIT={limit}: not a number"),
            }
        }
    }

    /// Persists the current configuration to the config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Set one key from its string form. An empty value unsets optional keys.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "relay_url" => {
                anyhow::ensure!(!value.is_empty(), "relay_url cannot be empty");
                self.relay_url = normalize_relay_url(value);
            }
            "username" => {
                self.username = Some(value.to_string()).filter(|u| !u.is_empty());
            }
            "message_log_limit" => {
                self.message_log_limit = if value.is_empty() || value == "none" {
                    None
                } else {
                    let limit: usize = value
                        .parse()
                        .with_context(|| format!("Invalid message_log_limit: {value}"))?;
                    Some(limit).filter(|&n| n > 0)
                };
            }
            other => anyhow::bail!(
                "Unknown config key '{other}' (expected one of: {})",
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.relay_url, "ws://localhost:8080");
        assert!(config.username.is_none());
        assert!(config.message_log_limit.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            relay_url: "wss://relay.example/chat".to_string(),
            username: Some("alice".to_string()),
            message_log_limit: Some(500),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults_and_normalizes_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"relay_url": "https://relay.example"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.relay_url, "wss://relay.example");
        assert!(config.username.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_unset_options_not_serialized() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("username"));
        assert!(!json.contains("message_log_limit"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("ROOMCHAT_RELAY_URL", "http://10.0.0.2:9000"),
            ("ROOMCHAT_USERNAME", "bob"),
            ("ROOMCHAT_LOG_LIMIT", "100"),
        ]));
        assert_eq!(config.relay_url, "ws://10.0.0.2:9000");
        assert_eq!(config.username.as_deref(), Some("bob"));
        assert_eq!(config.message_log_limit, Some(100));
    }

    #[test]
    fn test_bad_log_limit_override_is_ignored() {
        let mut config = Config {
            message_log_limit: Some(10),
            ..Config::default()
        };
        config.apply_overrides(lookup(&[("ROOMCHAT_LOG_LIMIT", "lots")]));
        assert_eq!(config.message_log_limit, Some(10));
    }

    #[test]
    fn test_set_key() {
        let mut config = Config::default();
        config.set_key("relay_url", "relay.example:80").unwrap();
        config.set_key("username", " carol ").unwrap();
        config.set_key("message_log_limit", "25").unwrap();
        assert_eq!(config.relay_url, "ws://relay.example:80");
        assert_eq!(config.username.as_deref(), Some("carol"));
        assert_eq!(config.message_log_limit, Some(25));

        config.set_key("username", "").unwrap();
        config.set_key("message_log_limit", "none").unwrap();
        assert!(config.username.is_none());
        assert!(config.message_log_limit.is_none());
    }

    #[test]
    fn test_set_key_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set_key("colour", "blue").is_err());
        assert!(config.set_key("relay_url", "  ").is_err());
        assert!(config.set_key("message_log_limit", "-3").is_err());
    }
}
