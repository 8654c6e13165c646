//! # hound-search
//!
//! Concurrent multi-site movie search for MoviesHound.
//!
//! A query fans out to every site in the registry that is active under the
//! current category filter. Results and per-site status stream back as each
//! site answers; a newer query supersedes an older one, whose late answers
//! are discarded.
//!
//! ## Design
//!
//! - Every query gets a monotonically increasing [`Generation`]; outcomes
//!   are applied only while their generation is current
//! - Results are de-duplicated by link across sites, first arrival wins
//! - Each site has a status (loading, success, idle, blocked, error) that
//!   settles exactly once per generation
//! - Site addresses churn, so a [`sync::synchronize`] pass discovers live
//!   mirrors from redirect and hub sources and merges them by brand
//! - Collaborators ([`SiteQuery`], [`SiteDiscovery`], [`RegistryStore`]) are
//!   traits; HTTP implementations are provided, persistence is left to the
//!   embedding application
//!
//! ## Security
//!
//! - No network listeners; this is a library
//! - Query text is logged only at trace level

pub mod address;
pub mod backend;
pub mod config;
pub mod discovery;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod outcome;
pub mod registry;
pub mod sites;
pub mod status;
pub mod sync;
pub mod types;

pub use backend::{RegistryStore, SiteDiscovery, SiteQuery};
pub use config::{BrandProfile, DiscoveryConfig, SearchConfig};
pub use discovery::HubDiscovery;
pub use error::{Result, SearchError};
pub use orchestrator::{Generation, HoundEvent, Orchestrator, QueryHandle, SessionSnapshot};
pub use outcome::{QueryResponse, SourceOutcome};
pub use registry::{Registry, RegistrySnapshot, SiteRecord};
pub use sites::SiteSearchClient;
pub use status::{SourceState, SourceStatus};
pub use sync::{merge, synchronize, SyncReport};
pub use types::{Category, CategoryFilter, SearchResult, Source};

/// Build an orchestrator that queries sites over HTTP.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid, or
/// [`SearchError::Http`] if the HTTP client cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> hound_search::Result<()> {
/// use hound_search::{CategoryFilter, Registry, SearchConfig};
///
/// let orchestrator = hound_search::http_orchestrator(Registry::defaults(), &SearchConfig::default())?;
/// let session = orchestrator
///     .search_until_settled("the batman", CategoryFilter::All)
///     .await?;
/// for result in &session.results {
///     println!("[{}] {}: {}", result.site, result.title, result.link);
/// }
/// # Ok(())
/// # }
/// ```
pub fn http_orchestrator(
    registry: Registry,
    config: &SearchConfig,
) -> Result<Orchestrator<SiteSearchClient>> {
    let client = SiteSearchClient::new(config)?;
    Ok(Orchestrator::new(client, registry, config))
}
