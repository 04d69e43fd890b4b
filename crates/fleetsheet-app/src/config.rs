//! Configuration management for fleetsheet
//!
//! Config stored at: ~/.config/fleetsheet/config.json

use fleetsheet_infra::api::{ApiSettings, Login};
use fleetsheet_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_USERNAME: &str = "FLEETSHEET_USERNAME";
pub const ENV_PASSWORD: &str = "FLEETSHEET_PASSWORD";
pub const ENV_BASIC_AUTH: &str = "FLEETSHEET_BASIC_AUTH";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fleet API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Pre-encoded basic auth value for the login endpoint
    #[serde(default)]
    pub basic_auth_token: String,

    #[serde(default = "default_auth_timeout")]
    pub auth_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Label lookups in flight
    #[serde(default = "default_label_concurrency")]
    pub label_concurrency: usize,

    /// Address the upload server listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Largest upload body the server accepts, in bytes
    #[serde(default = "default_upload_limit")]
    pub upload_limit_bytes: usize,

    /// Upload server used by `render`
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Default output format for `show`
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_api_base_url() -> String {
    "https://api.baubuddy.de".to_string()
}

fn default_auth_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_label_concurrency() -> usize {
    4
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_upload_limit() -> usize {
    crate::server::DEFAULT_UPLOAD_LIMIT
}

fn default_server_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            username: String::new(),
            password: String::new(),
            basic_auth_token: String::new(),
            auth_timeout_secs: default_auth_timeout(),
            request_timeout_secs: default_request_timeout(),
            label_concurrency: default_label_concurrency(),
            bind: default_bind(),
            upload_limit_bytes: default_upload_limit(),
            server_url: default_server_url(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("fleetsheet");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file (or defaults), then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_json(&content)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Credentials from the environment take precedence over the file
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = lookup(ENV_USERNAME) {
            self.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(token) = lookup(ENV_BASIC_AUTH) {
            self.basic_auth_token = token;
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url is empty".to_string()).into());
        }
        if self.label_concurrency == 0 {
            return Err(ConfigError::Invalid("label_concurrency must be at least 1".to_string()).into());
        }
        if self.upload_limit_bytes == 0 {
            return Err(ConfigError::Invalid("upload_limit_bytes must be positive".to_string()).into());
        }
        if self.auth_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()).into());
        }
        Ok(())
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings::new(
            self.api_base_url.clone(),
            Login::new(self.username.clone(), self.password.clone()),
        )
        .with_basic_auth_token(self.basic_auth_token.clone())
        .with_timeouts(
            Duration::from_secs(self.auth_timeout_secs),
            Duration::from_secs(self.request_timeout_secs),
        )
        .with_label_concurrency(self.label_concurrency)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fleetsheet Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(f, "API base URL:      {}", self.api_base_url)?;
        writeln!(
            f,
            "Username:          {}",
            if self.username.is_empty() { "(unset)" } else { &self.username }
        )?;
        writeln!(
            f,
            "Password:          {}",
            if self.password.is_empty() { "(unset)" } else { "********" }
        )?;
        writeln!(
            f,
            "Basic auth token:  {}",
            if self.basic_auth_token.is_empty() { "(unset)" } else { "********" }
        )?;
        writeln!(f, "Auth timeout:      {}s", self.auth_timeout_secs)?;
        writeln!(f, "Request timeout:   {}s", self.request_timeout_secs)?;
        writeln!(f, "Label concurrency: {}", self.label_concurrency)?;
        writeln!(f, "Server bind:       {}", self.bind)?;
        writeln!(f, "Upload limit:      {} bytes", self.upload_limit_bytes)?;
        writeln!(f, "Server URL:        {}", self.server_url)?;
        writeln!(f, "Output format:     {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:       {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{"username": "365", "label_concurrency": 8}"#).unwrap();
        assert_eq!(config.username, "365");
        assert_eq!(config.label_concurrency, 8);
        assert_eq!(config.api_base_url, "https://api.baubuddy.de");
        assert_eq!(config.auth_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.upload_limit_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(
            err,
            fleetsheet_types::Error::Config(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut config = Config::default();
        config.username = "file-user".to_string();
        config.apply_env(|key| match key {
            ENV_USERNAME => Some("env-user".to_string()),
            ENV_BASIC_AUTH => Some("abc==".to_string()),
            _ => None,
        });
        assert_eq!(config.username, "env-user");
        assert_eq!(config.password, "");
        assert_eq!(config.basic_auth_token, "abc==");
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.label_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upload_limit_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_hides_secrets() {
        let mut config = Config::default();
        config.password = "hunter2".to_string();
        let shown = config.to_string();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("Label concurrency: 4"));
    }

    #[test]
    fn test_api_settings() {
        let settings = Config::default().api_settings();
        assert_eq!(settings.auth_timeout, Duration::from_secs(10));
        assert_eq!(settings.label_concurrency, 4);
    }
}
