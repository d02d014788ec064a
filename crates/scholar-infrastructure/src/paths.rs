//! Unified path management for scholar configuration and data files.
//!
//! Every file the application touches is resolved here so the CLI, the
//! store and the log writer agree on locations across platforms.

use std::path::PathBuf;

/// Environment variable that relocates every scholar directory under one root.
pub const SCHOLAR_HOME_ENV: &str = "SCHOLAR_HOME";

const APP_DIR: &str = "scholar";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home/config directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for scholar.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/scholar/           # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/scholar/      # Data directory
/// ├── sessions.json            # Persisted session collection
/// └── logs/                    # Application logs
///     └── scholar.log.YYYY-MM-DD
/// ```
///
/// With `SCHOLAR_HOME` set, both directories collapse into that root.
pub struct ScholarPaths;

impl ScholarPaths {
    fn home_override() -> Option<PathBuf> {
        std::env::var_os(SCHOLAR_HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// Returns the scholar configuration directory (e.g., `~/.config/scholar/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        if let Some(root) = Self::home_override() {
            return Ok(root);
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the scholar data directory (e.g., `~/.local/share/scholar/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        if let Some(root) = Self::home_override() {
            return Ok(root);
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default path of the persisted session collection.
    pub fn sessions_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("sessions.json"))
    }

    /// Returns the directory rolling log files are written to.
    pub fn log_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
