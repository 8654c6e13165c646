//! Per-source query outcomes.
//!
//! A [`QueryResponse`] is what a [`crate::SiteQuery`] reports; a
//! [`SourceOutcome`] is the orchestrator's classification of it and drives
//! both the result aggregator and the status tracker.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::SearchResult;

/// Status reported for a successful query.
pub const STATUS_OK: &str = "ok";
/// Status reported when the site refused to serve the query.
pub const STATUS_BLOCKED: &str = "blocked";

/// Raw response from a site query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Results in site-reported order.
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// `"ok"`, `"ok-<suffix>"`, `"blocked"`, or an error code.
    pub status: String,
}

impl QueryResponse {
    /// A successful response.
    pub fn ok(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            status: STATUS_OK.to_string(),
        }
    }

    /// A blocked response.
    pub fn blocked() -> Self {
        Self {
            results: Vec::new(),
            status: STATUS_BLOCKED.to_string(),
        }
    }

    /// A response carrying an error code.
    pub fn error(code: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            status: code.into(),
        }
    }
}

/// Terminal result of one source's query attempt within a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The site answered with at least one result.
    Ok(Vec<SearchResult>),
    /// The site answered but had nothing matching.
    OkEmpty,
    /// The site refused the request.
    Blocked,
    /// The query failed; `detail` is the reported error code, if any.
    Error {
        /// Error code or short description.
        detail: Option<String>,
    },
}

impl SourceOutcome {
    /// Classify a site query result.
    ///
    /// Every result is attributed to `brand`, whatever the collaborator put in
    /// [`SearchResult::site`].
    pub fn classify(response: Result<QueryResponse, SearchError>, brand: &str) -> Self {
        let response = match response {
            Ok(response) => response,
            Err(SearchError::Blocked(_)) => return Self::Blocked,
            Err(_) => return Self::Error { detail: None },
        };

        let status = response.status.trim();
        if status.starts_with(STATUS_OK) {
            if response.results.is_empty() {
                return Self::OkEmpty;
            }
            let results = response
                .results
                .into_iter()
                .map(|result| SearchResult {
                    site: brand.to_string(),
                    ..result
                })
                .collect();
            return Self::Ok(results);
        }

        if status == STATUS_BLOCKED {
            return Self::Blocked;
        }

        let detail = (!status.is_empty()).then(|| status.to_string());
        Self::Error { detail }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::OkEmpty => "ok-empty",
            Self::Blocked => "blocked",
            Self::Error { .. } => "error",
        }
    }
}
