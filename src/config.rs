//! Configuration loading and management
//!
//! Handles parsing of `trackwise.toml`. Every field has a default, so a
//! missing file is equivalent to an empty one.

use std::path::{Path, PathBuf};

use chrono::Weekday;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::STATE_FILE;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE: &str = "trackwise.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where state is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ordering advisor
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Dashboard presentation
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Explicit state file; defaults to the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Ordering advisor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Set to false to always keep the current order
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the Ollama-compatible server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// First day of the weekly overview
    #[serde(default)]
    pub week_starts_on: WeekStart,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "trackwise")
}

impl Config {
    /// Load configuration from a file, validating it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `trackwise.toml` from `dir`, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Resolve configuration: an explicit path must load cleanly; otherwise
    /// the platform config directory is consulted leniently.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(project_dirs()
                .map(|dirs| Self::load_from_dir(dirs.config_dir()))
                .unwrap_or_default()),
        }
    }

    /// Save configuration to a file, creating its directory
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `trackwise.toml` in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// State file path: override, then config, then platform data dir.
    pub fn state_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.storage.path {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(STATE_FILE))
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "cannot determine a data directory; pass --state or set storage.path"
                        .to_string(),
                )
            })
    }

    fn validate(&self) -> Result<()> {
        self.advisor.validate()
    }
}

impl AdvisorConfig {
    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "advisor.base_url cannot be empty".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "advisor.model cannot be empty".to_string(),
            ));
        }
        if !(1..=600).contains(&self.timeout_secs) {
            return Err(Error::InvalidConfig(
                "advisor.timeout_secs must be between 1 and 600".to_string(),
            ));
        }
        Ok(())
    }
}
