//! JSON file persistence for the site registry.
//!
//! The registry is stored as a single JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at": "2026-01-01T00:00:00Z",
//!   "sites": {
//!     "https://moviesmod.town/": { "name": "MoviesMod", "categories": ["international"] }
//!   }
//! }
//! ```
//!
//! Writes are atomic (temp file → fsync → rename) so a crash mid-save never
//! leaves a truncated registry behind.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hound_search::{Registry, RegistrySnapshot, RegistryStore, SearchError, SiteRecord};
use serde::{Deserialize, Serialize};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredRegistry {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    sites: BTreeMap<String, SiteRecord>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// [`RegistryStore`] backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store reading and writing `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<Option<Registry>, SearchError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SearchError::Storage(format!(
                    "failed to read '{}': {e}",
                    self.path.display()
                )));
            }
        };

        let stored: StoredRegistry = serde_json::from_str(&text).map_err(|e| {
            SearchError::MalformedState(format!("'{}' is not valid: {e}", self.path.display()))
        })?;
        if stored.version != FORMAT_VERSION {
            return Err(SearchError::MalformedState(format!(
                "'{}' has unsupported version {}",
                self.path.display(),
                stored.version
            )));
        }

        let registry = Registry::from_snapshot(RegistrySnapshot {
            sites: stored.sites,
        })?;
        tracing::debug!(
            path = %self.path.display(),
            sources = registry.len(),
            saved_at = ?stored.saved_at,
            "registry loaded"
        );
        Ok(Some(registry))
    }

    fn save(&self, registry: &Registry) -> Result<(), SearchError> {
        let stored = StoredRegistry {
            version: FORMAT_VERSION,
            saved_at: Some(Utc::now()),
            sites: registry.to_snapshot().sites,
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| SearchError::Storage(format!("failed to serialize registry: {e}")))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SearchError::Storage(format!(
                    "failed to create directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        let tmp_path = self.tmp_path();
        let mut file = std::fs::File::create(&tmp_path).map_err(|e| {
            SearchError::Storage(format!(
                "failed to create temp file '{}': {e}",
                tmp_path.display()
            ))
        })?;
        file.write_all(json.as_bytes())
            .map_err(|e| SearchError::Storage(format!("failed to write temp file: {e}")))?;
        file.sync_all()
            .map_err(|e| SearchError::Storage(format!("failed to sync temp file: {e}")))?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            SearchError::Storage(format!(
                "failed to rename '{}' to '{}': {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })?;
        tracing::debug!(path = %self.path.display(), sources = registry.len(), "registry saved");
        Ok(())
    }
}
