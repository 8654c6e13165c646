//! The source registry: address → [`Source`], replaced wholesale.
//!
//! A [`Registry`] is an immutable snapshot once built. Synchronisation
//! produces a new one (see [`crate::sync`]); the orchestrator swaps it in
//! atomically and persists it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::normalize_address;
use crate::backend::RegistryStore;
use crate::error::SearchError;
use crate::types::{Category, CategoryFilter, Source};

/// Built-in fallback catalog used when nothing valid has been persisted.
const DEFAULT_SITES: &[(&str, &str, &[Category])] = &[
    ("https://moviesmod.town/", "MoviesMod", &[Category::International]),
    ("https://moviesleech.zip/", "MoviesLeech", &[Category::International]),
    (
        "https://rogmovies.world/",
        "RogMovies",
        &[Category::International, Category::Indian],
    ),
    (
        "https://new3.hdhub4u.fo/",
        "HDHub4u",
        &[Category::Indian, Category::International],
    ),
    (
        "https://vegamovies.gratis/",
        "VegaMovies",
        &[Category::International, Category::Indian, Category::Korean, Category::Anime],
    ),
    ("https://bolly4u.fyi/", "Bolly4u", &[Category::Indian]),
    ("https://uhdmovies.loan/", "UHDMovies", &[Category::International]),
];

/// Mapping from site address to [`Source`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    sources: BTreeMap<String, Source>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in default catalog.
    pub fn defaults() -> Self {
        DEFAULT_SITES
            .iter()
            .map(|(address, name, categories)| {
                Source::new(*address, *name, categories.iter().copied())
            })
            .collect()
    }

    /// Look up a source by address.
    pub fn get(&self, address: &str) -> Option<&Source> {
        self.sources.get(address)
    }

    /// Returns `true` if a source is registered under `address`.
    pub fn contains(&self, address: &str) -> bool {
        self.sources.contains_key(address)
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if no source is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterate over sources in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.values()
    }

    /// Sources active under `filter`, in address order.
    pub fn active_sources(&self, filter: &CategoryFilter) -> Vec<Source> {
        self.iter().filter(|s| s.matches(filter)).cloned().collect()
    }

    /// Convert into the serialisable persisted shape.
    pub fn to_snapshot(&self) -> RegistrySnapshot {
        let sites = self
            .iter()
            .map(|source| {
                (
                    source.address.clone(),
                    SiteRecord {
                        name: source.name.clone(),
                        categories: source.categories.iter().copied().collect(),
                    },
                )
            })
            .collect();
        RegistrySnapshot { sites }
    }

    /// Validate a persisted snapshot and build a registry from it.
    ///
    /// Addresses are stored in canonical form (see [`normalize_address`]).
    ///
    /// The snapshot is accepted or rejected as a whole: an empty site map,
    /// an address that is not an absolute `http(s)` URL, or a blank brand
    /// name rejects everything.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedState`] describing the first problem found.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, SearchError> {
        if snapshot.sites.is_empty() {
            return Err(SearchError::MalformedState("registry has no sites".into()));
        }

        let mut sources = BTreeMap::new();
        for (address, record) in snapshot.sites {
            let Some(key) = normalize_address(&address) else {
                return Err(SearchError::MalformedState(format!(
                    "invalid site address `{address}`"
                )));
            };
            let name = record.name.trim();
            if name.is_empty() {
                return Err(SearchError::MalformedState(format!(
                    "site `{address}` has an empty name"
                )));
            }
            let source = Source::new(key.clone(), name, record.categories);
            sources.insert(key, source);
        }

        Ok(Self { sources })
    }
}

impl FromIterator<Source> for Registry {
    fn from_iter<I: IntoIterator<Item = Source>>(iter: I) -> Self {
        let sources = iter
            .into_iter()
            .map(|source| (source.address.clone(), source))
            .collect();
        Self { sources }
    }
}

/// Serialisable registry shape: `{"sites": {address: {name, categories}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Sites keyed by address.
    pub sites: BTreeMap<String, SiteRecord>,
}

/// Persisted attributes of one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Brand name.
    pub name: String,
    /// Category tags.
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Load the persisted registry, falling back to [`Registry::defaults`].
///
/// A missing snapshot and a malformed one both yield the defaults; the
/// latter is logged and otherwise treated as a silent recovery.
pub fn load_or_defaults<S: RegistryStore>(store: &S) -> Registry {
    match store.load() {
        Ok(Some(registry)) => {
            tracing::debug!(sources = registry.len(), "loaded persisted registry");
            registry
        }
        Ok(None) => {
            tracing::debug!("no persisted registry, using defaults");
            Registry::defaults()
        }
        Err(err) => {
            tracing::warn!(error = %err, "persisted registry rejected, using defaults");
            Registry::defaults()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedStore(Mutex<Option<Result<Option<Registry>, SearchError>>>);

    impl FixedStore {
        fn new(result: Result<Option<Registry>, SearchError>) -> Self {
            Self(Mutex::new(Some(result)))
        }
    }

    impl RegistryStore for FixedStore {
        fn load(&self) -> Result<Option<Registry>, SearchError> {
            self.0
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take()
                .unwrap_or(Ok(None))
        }

        fn save(&self, _registry: &Registry) -> Result<(), SearchError> {
            Ok(())
        }
    }

    #[test]
    fn defaults_are_valid_and_brand_unique() {
        let registry = Registry::defaults();
        assert_eq!(registry.len(), DEFAULT_SITES.len());

        let mut brands: Vec<String> = registry.iter().map(Source::brand_key).collect();
        brands.sort();
        brands.dedup();
        assert_eq!(brands.len(), registry.len());

        for source in registry.iter() {
            assert_eq!(
                normalize_address(&source.address).as_deref(),
                Some(source.address.as_str())
            );
        }
    }

    #[test]
    fn active_sources_respects_filter() {
        let registry: Registry = [
            Source::new("https://a.example/", "Anime", [Category::Anime]),
            Source::new("https://b.example/", "Bolly", [Category::Indian]),
            Source::new("https://c.example/", "Plain", []),
        ]
        .into_iter()
        .collect();

        assert_eq!(registry.active_sources(&CategoryFilter::All).len(), 3);

        let anime = registry.active_sources(&CategoryFilter::Only(Category::Anime));
        assert_eq!(anime.len(), 1);
        assert_eq!(anime[0].name, "Anime");

        let korean = registry.active_sources(&CategoryFilter::Only(Category::Korean));
        assert!(korean.is_empty());
    }

    #[test]
    fn snapshot_round_trip_preserves_registry() {
        let registry = Registry::defaults();
        let restored = Registry::from_snapshot(registry.to_snapshot()).expect("valid");
        assert_eq!(restored, registry);
    }

    #[test]
    fn empty_snapshot_rejected() {
        let err = Registry::from_snapshot(RegistrySnapshot::default()).unwrap_err();
        assert!(matches!(err, SearchError::MalformedState(_)));
    }

    #[test]
    fn one_bad_address_rejects_whole_snapshot() {
        let mut snapshot = Registry::defaults().to_snapshot();
        snapshot.sites.insert(
            "javascript:alert(1)".into(),
            SiteRecord {
                name: "Evil".into(),
                categories: vec![],
            },
        );
        let err = Registry::from_snapshot(snapshot).unwrap_err();
        assert!(err.to_string().contains("invalid site address"));
    }

    #[test]
    fn blank_name_rejected() {
        let mut snapshot = RegistrySnapshot::default();
        snapshot.sites.insert(
            "https://x.example/".into(),
            SiteRecord {
                name: "   ".into(),
                categories: vec![],
            },
        );
        let err = Registry::from_snapshot(snapshot).unwrap_err();
        assert!(err.to_string().contains("empty name"));
    }

    #[test]
    fn snapshot_addresses_are_canonicalised() {
        let json = r#"{"sites":{"HTTPS://X.Example:443":{"name":"X"}}}"#;
        let snapshot: RegistrySnapshot = serde_json::from_str(json).expect("parse");
        let registry = Registry::from_snapshot(snapshot).expect("valid");
        assert_eq!(registry.len(), 1);
        let source = registry.get("https://x.example/").expect("canonical key");
        assert_eq!(source.address, "https://x.example/");
        assert!(!registry.contains("HTTPS://X.Example:443"));
    }

    #[test]
    fn snapshot_categories_default_to_empty() {
        let json = r#"{"sites":{"https://x.example/":{"name":"X"}}}"#;
        let snapshot: RegistrySnapshot = serde_json::from_str(json).expect("parse");
        let registry = Registry::from_snapshot(snapshot).expect("valid");
        let source = registry.get("https://x.example/").expect("present");
        assert!(source.categories.is_empty());
    }

    #[test]
    fn load_or_defaults_uses_persisted_registry() {
        let persisted: Registry = [Source::new("https://x.example/", "X", [])]
            .into_iter()
            .collect();
        let store = FixedStore::new(Ok(Some(persisted.clone())));
        assert_eq!(load_or_defaults(&store), persisted);
    }

    #[test]
    fn load_or_defaults_falls_back_when_absent() {
        let store = FixedStore::new(Ok(None));
        assert_eq!(load_or_defaults(&store), Registry::defaults());
    }

    #[test]
    fn load_or_defaults_falls_back_when_malformed() {
        let store = FixedStore::new(Err(SearchError::MalformedState("bad json".into())));
        assert_eq!(load_or_defaults(&store), Registry::defaults());
    }
}
