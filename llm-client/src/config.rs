use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LlmError, Result};
use crate::secret::ApiKey;

/// Environment variable consulted after the configured key list
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model used when no --model flag is provided
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Minimum pause between successful generations, in seconds
    #[serde(default = "default_pacing_secs")]
    pub pacing_secs: u64,

    /// Gateway connection settings
    #[serde(default)]
    pub gemini: GatewayConfig,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_pacing_secs() -> u64 {
    4
}

/// Gateway-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Default API keys, in order of preference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_keys: Vec<String>,

    /// Custom base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if it is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home =
            std::env::var("HOME").map_err(|_| LlmError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/cli-programs/suneung.toml"))
    }

    /// Ordered default credentials: configured keys, then `GEMINI_API_KEY`
    pub fn default_api_keys(&self) -> Vec<ApiKey> {
        collect_keys(&self.gemini.api_keys, std::env::var(API_KEY_ENV).ok())
    }

    /// Append a key to the default list unless it is already present
    pub fn add_api_key(&mut self, raw: &str) -> Result<()> {
        let key = ApiKey::new(raw)
            .ok_or_else(|| LlmError::ConfigError("API key must not be empty".into()))?;
        if !self.gemini.api_keys.iter().any(|k| k.trim() == key.expose()) {
            self.gemini.api_keys.push(key.expose().to_string());
        }
        Ok(())
    }
}

fn collect_keys(configured: &[String], from_env: Option<String>) -> Vec<ApiKey> {
    let mut keys: Vec<ApiKey> = configured.iter().filter_map(|k| ApiKey::new(k.as_str())).collect();
    if let Some(key) = from_env.and_then(|k| ApiKey::new(k)) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            pacing_secs: default_pacing_secs(),
            gemini: GatewayConfig::default(),
        }
    }
}
