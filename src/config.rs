// src/config.rs

//! Configuration file location and persistence.
//!
//! The config lives at `~/.sitemaptool/config.json` unless `--config` says
//! otherwise, and is created with defaults the first time it is needed.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::safe_io::{atomic_write_json, read_optional};

/// Directory under the home directory holding the default config.
pub const CONFIG_DIR: &str = ".sitemaptool";

/// File name of the default config.
pub const CONFIG_FILE: &str = "config.json";

/// A JSON config file on disk.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.sitemaptool/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| AppError::config(CONFIG_DIR, "cannot determine home directory"))?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, writing defaults first if the file is absent.
    ///
    /// Values are not validated here, so `config` can still show and repair
    /// them; the engine commands validate when building their context.
    pub fn load_or_init(&self) -> Result<Config> {
        let bytes = read_optional(&self.path).map_err(|e| AppError::config(&self.path, e))?;
        let Some(bytes) = bytes else {
            log::info!("Creating default config at {}", self.path.display());
            let config = Config::default();
            self.save(&config)?;
            return Ok(config);
        };

        let config: Config =
            serde_json::from_slice(&bytes).map_err(|e| AppError::config(&self.path, e))?;
        log::debug!("Loaded config from {}", self.path.display());
        Ok(config)
    }

    /// Persist atomically.
    pub fn save(&self, config: &Config) -> Result<()> {
        atomic_write_json(&self.path, config).map_err(|e| AppError::config(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_writes_defaults() {
        let tmp = TempDir::new().unwrap();
        let file = ConfigFile::new(tmp.path().join(".sitemaptool").join("config.json"));

        let config = file.load_or_init().unwrap();
        assert_eq!(config, Config::default());
        assert!(file.path().exists());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(written["sitemap_prefix"], "sitemap");
        assert_eq!(written["default_priority"], 0.5);
    }

    #[test]
    fn test_set_then_save_round_trip() {
        let tmp = TempDir::new().unwrap();
        let file = ConfigFile::new(tmp.path().join("config.json"));

        let mut config = file.load_or_init().unwrap();
        config.set("base_url", "https://blog.example.org").unwrap();
        config.set("ping_on_update", "true").unwrap();
        file.save(&config).unwrap();

        let reloaded = file.load_or_init().unwrap();
        assert_eq!(reloaded.base_url, "https://blog.example.org");
        assert!(reloaded.ping_on_update);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "base_url": "https://example.net" }"#).unwrap();

        let config = ConfigFile::new(&path).load_or_init().unwrap();
        assert_eq!(config.base_url, "https://example.net");
        assert_eq!(config.sitemap_prefix, "sitemap");
        assert_eq!(config.max_urls_per_sitemap, 50_000);
    }

    #[test]
    fn test_unreadable_config_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = ConfigFile::new(&path).load_or_init().unwrap_err();
        assert!(matches!(err, AppError::ConfigIo { .. }));
    }

    #[test]
    fn test_invalid_values_load_but_fail_validation() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "default_priority": 3.0 }"#).unwrap();

        let config = ConfigFile::new(&path).load_or_init().unwrap();
        assert_eq!(config.default_priority, 3.0);
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_invalid_base_url_can_be_repaired() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "base_url": "example.com" }"#).unwrap();
        let file = ConfigFile::new(&path);

        let mut config = file.load_or_init().unwrap();
        assert!(config.validate().is_err());
        config.set("base_url", "https://example.com").unwrap();
        file.save(&config).unwrap();

        let repaired = file.load_or_init().unwrap();
        assert_eq!(repaired.base_url, "https://example.com");
        assert!(repaired.validate().is_ok());
    }
}
