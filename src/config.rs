//! Application configuration loaded from `config.toml`.
//!
//! ```toml
//! [search]
//! timeout_seconds = 7
//!
//! [discovery]
//! hub_sources = ["https://vglist.cv/"]
//!
//! [registry]
//! sync_on_startup = false
//! ```
//!
//! Every section and field is optional; missing values take their defaults.

use std::path::{Path, PathBuf};

use hound_search::{DiscoveryConfig, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{HoundError, Result};
use crate::hound_dirs;

/// Where the site registry lives and when it is refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry file; defaults to [`hound_dirs::registry_file`].
    pub path: Option<PathBuf>,
    /// Run a discovery pass when the application starts.
    pub sync_on_startup: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: None,
            sync_on_startup: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoundConfig {
    /// Per-site query settings.
    pub search: SearchConfig,
    /// Live address discovery settings.
    pub discovery: DiscoveryConfig,
    /// Registry persistence settings.
    pub registry: RegistryConfig,
}

impl HoundConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            HoundError::Config(format!("failed to parse '{}': {e}", path.display()))
        })
    }

    /// Load configuration from `path`, or the defaults if the file does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HoundError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `config_dir()/config.toml`.
    pub fn default_config_path() -> PathBuf {
        hound_dirs::config_file()
    }

    /// Path of the persisted registry.
    pub fn registry_path(&self) -> PathBuf {
        self.registry
            .path
            .clone()
            .unwrap_or_else(hound_dirs::registry_file)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.discovery.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HoundConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.registry.sync_on_startup);
    }

    #[test]
    fn partial_toml_takes_defaults() {
        let config: HoundConfig = toml::from_str(
            r#"
            [search]
            timeout_seconds = 3

            [registry]
            sync_on_startup = false
            "#,
        )
        .unwrap();
        assert_eq!(config.search.timeout_seconds, 3);
        assert_eq!(config.search.min_title_len, 3);
        assert!(!config.registry.sync_on_startup);
        assert_eq!(config.discovery, DiscoveryConfig::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = HoundConfig::default();
        config.search.user_agent = Some("HoundTest/1.0".into());
        config.registry.path = Some(dir.path().join("sites.json"));
        config.save_to_file(&path).unwrap();

        let loaded = HoundConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = HoundConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(HoundError::Io(_))));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = HoundConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, HoundConfig::default());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        let result = HoundConfig::from_file(&path);
        assert!(matches!(result, Err(HoundError::Config(_))));
    }

    #[test]
    fn invalid_section_fails_validation() {
        let mut config = HoundConfig::default();
        config.search.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(HoundError::Search(_))));
    }

    #[test]
    fn registry_path_override() {
        let mut config = HoundConfig::default();
        assert!(config.registry_path().ends_with("sites.json"));
        config.registry.path = Some(PathBuf::from("/srv/hound/registry.json"));
        assert_eq!(config.registry_path(), PathBuf::from("/srv/hound/registry.json"));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = HoundConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
    }
}
