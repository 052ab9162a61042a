//! Configuration management for the NovaMind pipeline
//!
//! Settings are layered: an optional JSON file, then `NOVAMIND__`-style
//! environment overrides, then the conventional `ANTHROPIC_API_KEY` and
//! `HUBSPOT_API_KEY` variables for keys that are still empty.

use serde::{Deserialize, Serialize};
use crate::error::{NovaMindError, Result};
use std::path::{Path, PathBuf};

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const HUBSPOT_API_KEY_ENV: &str = "HUBSPOT_API_KEY";
const ENV_PREFIX: &str = "NOVAMIND";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NovaMindConfig {
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub hubspot: HubSpotConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(alias = "token", default)]
    pub api_key: String,

    #[serde(default = "default_anthropic_model")]
    pub model: String,

    #[serde(alias = "url", default = "default_anthropic_base_url")]
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_anthropic_model(),
            base_url: default_anthropic_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSpotConfig {
    /// Private-app token. Absent or empty means simulation mode.
    #[serde(alias = "token", default)]
    pub api_key: Option<String>,

    #[serde(alias = "url", default = "default_hubspot_base_url")]
    pub base_url: String,

    #[serde(default = "default_hubspot_timeout_secs")]
    pub timeout_secs: u64,
}

impl HubSpotConfig {
    /// Configured token, ignoring blank values
    pub fn token(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_hubspot_base_url(),
            timeout_secs: default_hubspot_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_contacts_path")]
    pub contacts_path: PathBuf,

    #[serde(default = "default_campaign_log_path")]
    pub campaign_log_path: PathBuf,

    #[serde(default = "default_personas_path")]
    pub personas_path: PathBuf,

    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            contacts_path: default_contacts_path(),
            campaign_log_path: default_campaign_log_path(),
            personas_path: default_personas_path(),
            reports_dir: default_reports_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

// Default functions
fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_hubspot_base_url() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_hubspot_timeout_secs() -> u64 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/novamind.db")
}

fn default_contacts_path() -> PathBuf {
    PathBuf::from("data/mock_contacts.json")
}

fn default_campaign_log_path() -> PathBuf {
    PathBuf::from("data/campaign_logs.json")
}

fn default_personas_path() -> PathBuf {
    PathBuf::from("data/personas.json")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

impl NovaMindConfig {
    /// Load configuration from a JSON file, layered with environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NovaMindError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::load(Some(path))
    }

    /// Load configuration from an optional JSON file and the environment.
    ///
    /// A missing file is not an error here: every field has a default except
    /// the Anthropic key, which `validate` checks.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.apply_env_fallbacks(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| NovaMindError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Fill empty API keys from the conventional environment variables
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.anthropic.api_key.trim().is_empty() {
            if let Some(key) = lookup(ANTHROPIC_API_KEY_ENV) {
                self.anthropic.api_key = key;
            }
        }

        if self.hubspot.token().is_none() {
            if let Some(key) = lookup(HUBSPOT_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
                self.hubspot.api_key = Some(key);
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.anthropic.api_key.trim().is_empty() {
            return Err(NovaMindError::Config(format!(
                "Anthropic API key is required (set anthropic.api_key or {})",
                ANTHROPIC_API_KEY_ENV
            )));
        }

        if self.anthropic.model.trim().is_empty() {
            return Err(NovaMindError::Config("Anthropic model name is required".to_string()));
        }

        if self.hubspot.timeout_secs == 0 {
            return Err(NovaMindError::Config("HubSpot timeout must be greater than zero".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_fallback_fills_missing_keys() {
        let mut config = NovaMindConfig::default();
        config.apply_env_fallbacks(|name| match name {
            ANTHROPIC_API_KEY_ENV => Some("sk-ant-test".to_string()),
            HUBSPOT_API_KEY_ENV => Some("pat-test".to_string()),
            _ => None,
        });

        assert_eq!(config.anthropic.api_key, "sk-ant-test");
        assert_eq!(config.hubspot.token(), Some("pat-test"));
    }

    #[test]
    fn test_env_fallback_keeps_configured_keys() {
        let mut config = NovaMindConfig::default();
        config.anthropic.api_key = "from-file".to_string();
        config.apply_env_fallbacks(|_| Some("from-env".to_string()));

        assert_eq!(config.anthropic.api_key, "from-file");
    }

    #[test]
    fn test_blank_hubspot_token_is_absent() {
        let config = HubSpotConfig {
            api_key: Some("   ".to_string()),
            ..HubSpotConfig::default()
        };
        assert!(config.token().is_none());
    }
}
