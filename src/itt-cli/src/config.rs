//! Configuration management for the itt CLI

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Object tables and `war3map.j`
    pub archive_dir: Option<PathBuf>,
    /// `.wurst` source tree
    pub source_dir: Option<PathBuf>,
    pub category_mappings: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub min_fuzzy_key_len: Option<usize>,
}

/// Keys accepted by `itt config set`
pub const KEYS: &[&str] = &[
    "archive_dir",
    "source_dir",
    "category_mappings",
    "output_dir",
    "min_fuzzy_key_len",
];

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("itt");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Set one key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "archive_dir" => self.archive_dir = Some(value.into()),
            "source_dir" => self.source_dir = Some(value.into()),
            "category_mappings" => self.category_mappings = Some(value.into()),
            "output_dir" => self.output_dir = Some(value.into()),
            "min_fuzzy_key_len" => {
                let len = value
                    .parse()
                    .with_context(|| format!("min_fuzzy_key_len must be a number, got {:?}", value))?;
                self.min_fuzzy_key_len = Some(len);
            }
            other => bail!("Unknown config key {:?} (expected one of: {})", other, KEYS.join(", ")),
        }
        Ok(())
    }
}
