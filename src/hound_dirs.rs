//! Centralized application directory paths for MoviesHound.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/hound/` | `~/.local/share/hound/` |
//! | Config | `~/Library/Application Support/hound/` | `~/.config/hound/` |
//!
//! # Environment Overrides
//!
//! - `HOUND_DATA_DIR`: overrides [`data_dir`]
//! - `HOUND_CONFIG_DIR`: overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Holds the persisted site registry.
///
/// Resolves to `dirs::data_dir()/hound/` by default. Override with
/// the `HOUND_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("HOUND_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("hound"))
        .unwrap_or_else(|| PathBuf::from("/tmp/hound-data"))
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/hound/` by default. Override with
/// the `HOUND_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("HOUND_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("hound"))
        .unwrap_or_else(|| PathBuf::from("/tmp/hound-config"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Persisted site registry (`data_dir()/sites.json`).
#[must_use]
pub fn registry_file() -> PathBuf {
    data_dir().join("sites.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_file_lives_in_data_dir() {
        assert!(registry_file().starts_with(data_dir()));
        assert!(registry_file().ends_with("sites.json"));
    }

    #[test]
    fn config_file_lives_in_config_dir() {
        assert!(config_file().starts_with(config_dir()));
        assert!(config_file().ends_with("config.toml"));
    }
}
