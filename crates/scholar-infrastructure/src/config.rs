//! Application configuration.
//!
//! Configuration is read from `config.toml` in the scholar config directory.
//! Every field has a default, so a missing file or a partial file is fine.
//! Environment variables override whatever the file says.
//!
//! ```toml
//! [endpoint]
//! base_url = "http://localhost:8000"
//! model = "LMS-MODEL"
//! timeout_secs = 120
//!
//! [storage]
//! sessions_file = "/home/me/.local/share/scholar/sessions.json"
//! ```

use std::path::{Path, PathBuf};

use scholar_core::error::{Result, ScholarError};
use serde::{Deserialize, Serialize};

use crate::paths::ScholarPaths;

/// Default assistant backend (the local chat-completions service).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Model identifier the assistant backend advertises.
pub const DEFAULT_MODEL: &str = "LMS-MODEL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const ENV_BASE_URL: &str = "SCHOLAR_BASE_URL";
pub const ENV_MODEL: &str = "SCHOLAR_MODEL";
pub const ENV_API_KEY: &str = "SCHOLAR_API_KEY";
pub const ENV_SESSIONS_FILE: &str = "SCHOLAR_SESSIONS_FILE";

/// Where the assistant lives and how to talk to it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Where sessions are persisted. `None` means the platform default.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_file: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads the config file at its default location, then applies
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = ScholarPaths::config_file().map_err(|e| ScholarError::config(e.to_string()))?;
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup; empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = get(ENV_BASE_URL) {
            self.endpoint.base_url = base_url;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.endpoint.model = model;
        }
        if let Some(api_key) = get(ENV_API_KEY) {
            self.endpoint.api_key = Some(api_key);
        }
        if let Some(file) = get(ENV_SESSIONS_FILE) {
            self.storage.sessions_file = Some(PathBuf::from(file));
        }
    }

    /// The configured sessions file, or the platform default.
    pub fn sessions_file(&self) -> Result<PathBuf> {
        match &self.storage.sessions_file {
            Some(path) => Ok(path.clone()),
            None => ScholarPaths::sessions_file().map_err(|e| ScholarError::config(e.to_string())),
        }
    }
}
