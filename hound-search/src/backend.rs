//! Collaborator traits the orchestrator and synchroniser depend on.
//!
//! - [`SiteQuery`] runs one query against one site.
//! - [`SiteDiscovery`] produces a freshly discovered source catalog.
//! - [`RegistryStore`] loads and saves the registry blob.
//!
//! The crate ships HTTP implementations of the first two
//! ([`crate::sites::SiteSearchClient`], [`crate::discovery::HubDiscovery`]);
//! persistence lives with the application.

use std::future::Future;

use crate::error::SearchError;
use crate::outcome::QueryResponse;
use crate::registry::Registry;

/// Runs a search against a single site.
///
/// Implementations report site-level conditions through
/// [`QueryResponse::status`] (`"ok"`, `"ok-<suffix>"`, `"blocked"` or an error
/// code) and return `Err` only for outright failures such as a transport
/// error or timeout. Returning [`SearchError::Blocked`] is treated the same as
/// a `"blocked"` status.
///
/// All implementations must be `Send + Sync`: one call per active site runs
/// concurrently.
pub trait SiteQuery: Send + Sync {
    /// Search `address` (branded `brand`) for `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when the site could not be queried at all.
    fn query(
        &self,
        text: &str,
        address: &str,
        brand: &str,
    ) -> impl Future<Output = Result<QueryResponse, SearchError>> + Send;
}

/// Discovers the currently live site addresses.
pub trait SiteDiscovery: Send + Sync {
    /// Produce a registry-shaped catalog of discovered sites.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if discovery failed or produced unusable data;
    /// the caller then leaves the current registry untouched.
    fn discover(&self) -> impl Future<Output = Result<Registry, SearchError>> + Send;
}

/// Loads and saves the persisted registry.
pub trait RegistryStore: Send + Sync {
    /// Load the persisted registry, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedState`] if a snapshot exists but fails
    /// validation, or [`SearchError::Storage`] if it cannot be read.
    fn load(&self) -> Result<Option<Registry>, SearchError>;

    /// Persist `registry`, replacing any previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Storage`] if the snapshot cannot be written.
    fn save(&self, registry: &Registry) -> Result<(), SearchError>;
}
