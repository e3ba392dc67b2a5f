//! Configuration management for armory CLI

use anyhow::{Context, Result};
use armory::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the catalog table JSON files
    pub catalog_dir: Option<PathBuf>,
    /// Default inventory export
    pub inventory: Option<PathBuf>,
    /// Wishlist store (JSON)
    pub wishlist: Option<PathBuf>,
    /// Tags applied to new wishlist entries when none are given
    pub default_tags: Vec<String>,
    pub engine: EngineConfig,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("armory");

        Ok(config_dir.join("config.toml"))
    }

    /// Default wishlist store location when none is configured
    pub fn default_wishlist_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .context("Could not determine data directory")?
            .join("armory");

        Ok(data_dir.join("wishlist.json"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    pub fn wishlist_path(&self) -> Result<PathBuf> {
        match &self.wishlist {
            Some(path) => Ok(path.clone()),
            None => Self::default_wishlist_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config {
            catalog_dir: Some(PathBuf::from("/data/catalog")),
            default_tags: vec!["pve".into()],
            ..Config::default()
        };
        config.engine.include_exotics = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.wishlist_path().ok(), Config::default_wishlist_path().ok());
    }

    #[test]
    fn test_partial_engine_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "inventory = \"inv.json\"\n\n[engine]\nmin_tier = 6\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.inventory, Some(PathBuf::from("inv.json")));
        assert_eq!(config.engine.min_tier, 6);
        assert!(config.engine.include_exotics);
    }
}
