use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{JoblensError, Result};
use crate::llm::DEFAULT_MODEL;

/// Global joblens configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Groq API key for the generative fallback; absent means disabled
    #[serde(default)]
    pub groq_api_key: Option<String>,

    /// Chat-completions model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for generative API calls, in seconds
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,

    /// Timeout for page fetches, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            model: default_model(),
            llm_timeout_secs: default_llm_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| JoblensError::ConfigError(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "joblens").ok_or_else(|| {
            JoblensError::ConfigError("Could not determine config directory".into())
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve the API key for the generative backend
    ///
    /// The GROQ_API_KEY environment variable overrides the config file.
    pub fn api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        self.groq_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
    }
}
