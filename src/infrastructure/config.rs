// src/infrastructure/config.rs
use crate::constants::{
    DEFAULT_AUTOSAVE_INTERVAL_MS, DEFAULT_MAX_RECORD_BYTES, DEFAULT_STORE_QUOTA_BYTES,
};
use crate::infrastructure::bundle::ExportSettings;
use crate::infrastructure::image::ImageSettings;
use crate::infrastructure::markdown::ConverterOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// TOML configuration for blogmark
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub image: ImageSettings,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub markdown: ConverterOptions,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    /// Store file; the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default = "default_max_record_bytes")]
    pub max_record_bytes: usize,
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AutosaveConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

// Default value functions
fn default_max_record_bytes() -> usize { DEFAULT_MAX_RECORD_BYTES }
fn default_quota_bytes() -> usize { DEFAULT_STORE_QUOTA_BYTES }
fn default_interval_ms() -> u64 { DEFAULT_AUTOSAVE_INTERVAL_MS }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_record_bytes: default_max_record_bytes(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load from `path`, or from the default location. A missing file yields
    /// the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blogmark").join("config.toml"))
    }

    /// Store file to use: `[storage].path`, else `blogmark/store.json` in the
    /// platform data directory.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("Could not find data directory")?;
        Ok(data_dir.join("blogmark").join("store.json"))
    }
}
