//! Application shell: wires config, persistence, discovery and the orchestrator.

use std::sync::Arc;

use hound_search::orchestrator::SessionSnapshot;
use hound_search::registry::load_or_defaults;
use hound_search::{
    CategoryFilter, HoundEvent, HubDiscovery, Orchestrator, QueryHandle, Registry,
    SiteSearchClient, Source, SyncReport,
};
use tokio::sync::broadcast;

use crate::config::HoundConfig;
use crate::error::Result;
use crate::store::JsonFileStore;

/// A running MoviesHound instance.
pub struct HoundApp {
    orchestrator: Orchestrator<SiteSearchClient>,
    discovery: HubDiscovery,
    store: JsonFileStore,
}

impl HoundApp {
    /// Build the application from `config` without touching the network.
    ///
    /// The registry is loaded from the configured file, falling back to the
    /// built-in defaults if it is missing or malformed.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or an HTTP client cannot be built.
    pub fn new(config: &HoundConfig) -> Result<Self> {
        config.validate()?;
        let store = JsonFileStore::new(config.registry_path());
        let registry = load_or_defaults(&store);
        tracing::info!(
            path = %store.path().display(),
            sources = registry.len(),
            "registry ready"
        );

        let orchestrator = hound_search::http_orchestrator(registry, &config.search)?;
        let discovery = HubDiscovery::new(config.discovery.clone())?;
        Ok(Self {
            orchestrator,
            discovery,
            store,
        })
    }

    /// Build the application and, if configured, refresh the registry.
    ///
    /// A failed startup sync is logged; the application keeps the registry it
    /// loaded.
    ///
    /// # Errors
    ///
    /// Same as [`HoundApp::new`].
    pub async fn start(config: &HoundConfig) -> Result<Self> {
        let app = Self::new(config)?;
        if config.registry.sync_on_startup {
            if let Err(err) = app.sync_sites().await {
                tracing::warn!(error = %err, "startup sync failed, keeping current registry");
            }
        }
        Ok(app)
    }

    /// Start a query; progress is reported through [`HoundApp::subscribe`].
    ///
    /// # Errors
    ///
    /// Returns an error for empty or whitespace-only text.
    pub fn search(&self, text: &str, filter: CategoryFilter) -> Result<QueryHandle> {
        Ok(self.orchestrator.submit_query(text, filter)?)
    }

    /// Run a query until every site has answered (or it was superseded).
    ///
    /// # Errors
    ///
    /// Returns an error for empty or whitespace-only text.
    pub async fn search_to_completion(
        &self,
        text: &str,
        filter: CategoryFilter,
    ) -> Result<SessionSnapshot> {
        Ok(self.orchestrator.search_until_settled(text, filter).await?)
    }

    /// Discover live addresses, merge them in and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails; the registry is left untouched.
    pub async fn sync_sites(&self) -> Result<SyncReport> {
        Ok(hound_search::synchronize(&self.orchestrator, &self.discovery, &self.store).await?)
    }

    /// Sources active under `filter`.
    pub fn sites(&self, filter: &CategoryFilter) -> Vec<Source> {
        self.orchestrator.registry().active_sources(filter)
    }

    /// The current registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.orchestrator.registry()
    }

    /// Current session: results and per-site status.
    pub fn session(&self) -> SessionSnapshot {
        self.orchestrator.session_snapshot()
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<HoundEvent> {
        self.orchestrator.subscribe()
    }
}
