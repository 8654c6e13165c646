//! Error types for the hound-search crate.
//!
//! Per-source failures are not errors at the session level: the query
//! collaborator reports them and the orchestrator records them as a source
//! status. The variants here cover what callers actually see.

/// Errors produced by search orchestration, synchronisation and the
/// bundled HTTP collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query text was empty or whitespace only. No generation is created.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A site refused to serve the request (HTTP 403 or a bot challenge).
    #[error("site blocked: {0}")]
    Blocked(String),

    /// An HTTP request to a site or hub failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Site discovery failed; the registry was left unchanged.
    #[error("sync failed: {0}")]
    Sync(String),

    /// A persisted registry snapshot failed validation.
    #[error("malformed persisted state: {0}")]
    MalformedState(String),

    /// Reading or writing the persisted registry failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for hound-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
