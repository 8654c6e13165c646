//! Per-source progress state machine.
//!
//! # State Machine
//!
//! ```text
//!              ok, n > 0      ┌─────────┐
//!          ┌─────────────────►│ Success │
//!          │                  └─────────┘
//!          │   ok, n = 0      ┌─────────┐
//! ┌────────┴┐────────────────►│  Idle   │
//! │ Loading │                 └─────────┘
//! └────────┬┘   blocked       ┌─────────┐
//!          ├─────────────────►│ Blocked │
//!          │                  └─────────┘
//!          │   error          ┌─────────┐
//!          └─────────────────►│  Error  │
//!                             └─────────┘
//! ```
//!
//! Every transition out of `Loading` is terminal. A source that never
//! answers stays `Loading` for the rest of its generation.

use serde::{Deserialize, Serialize};

use crate::outcome::SourceOutcome;

/// Progress state of one source within the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    /// Query in flight.
    Loading,
    /// Answered with results.
    Success,
    /// Answered with no results.
    Idle,
    /// Refused the request.
    Blocked,
    /// Failed.
    Error,
}

impl SourceState {
    /// Returns `true` once the source has settled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Display status of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    /// Brand name shown next to the indicator.
    pub name: String,
    /// Current state.
    pub state: SourceState,
    /// Number of results the source reported.
    pub count: usize,
    /// Short annotation such as `"(0)"` or `"(Blocked)"`.
    pub message: Option<String>,
}

impl SourceStatus {
    /// Initial status for a freshly dispatched source.
    pub fn loading(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: SourceState::Loading,
            count: 0,
            message: None,
        }
    }

    /// Apply an outcome. Returns `false`, leaving the status untouched, if
    /// the source has already settled.
    pub fn settle(&mut self, outcome: &SourceOutcome) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        let (state, count, message) = match outcome {
            SourceOutcome::Ok(results) => (SourceState::Success, results.len(), None),
            SourceOutcome::OkEmpty => (SourceState::Idle, 0, Some("(0)".to_string())),
            SourceOutcome::Blocked => (SourceState::Blocked, 0, Some("(Blocked)".to_string())),
            SourceOutcome::Error { detail } => {
                let detail = detail.as_deref().unwrap_or("Fail");
                (SourceState::Error, 0, Some(format!("({detail})")))
            }
        };

        self.state = state;
        self.count = count;
        self.message = message;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::outcome::QueryResponse;
    use crate::types::SearchResult;

    fn settled(response: Result<QueryResponse, SearchError>) -> SourceStatus {
        let mut status = SourceStatus::loading("Vega");
        assert!(status.settle(&SourceOutcome::classify(response, "Vega")));
        status
    }

    #[test]
    fn starts_loading() {
        let status = SourceStatus::loading("Vega");
        assert_eq!(status.state, SourceState::Loading);
        assert_eq!(status.count, 0);
        assert!(status.message.is_none());
        assert!(!status.state.is_terminal());
    }

    #[test]
    fn ok_empty_becomes_idle_zero() {
        let status = settled(Ok(QueryResponse::ok(vec![])));
        assert_eq!(status.state, SourceState::Idle);
        assert_eq!(status.count, 0);
        assert_eq!(status.message.as_deref(), Some("(0)"));
    }

    #[test]
    fn blocked_becomes_blocked() {
        let status = settled(Ok(QueryResponse::blocked()));
        assert_eq!(status.state, SourceState::Blocked);
        assert_eq!(status.message.as_deref(), Some("(Blocked)"));
    }

    #[test]
    fn one_result_becomes_success_one() {
        let status = settled(Ok(QueryResponse::ok(vec![SearchResult {
            title: "X".into(),
            link: "L1".into(),
            site: "Vega".into(),
        }])));
        assert_eq!(status.state, SourceState::Success);
        assert_eq!(status.count, 1);
        assert!(status.message.is_none());
    }

    #[test]
    fn error_detail_in_message() {
        let status = settled(Ok(QueryResponse::error("http-502")));
        assert_eq!(status.state, SourceState::Error);
        assert_eq!(status.message.as_deref(), Some("(http-502)"));
    }

    #[test]
    fn transport_failure_reads_fail() {
        let status = settled(Err(SearchError::Http("timed out".into())));
        assert_eq!(status.state, SourceState::Error);
        assert_eq!(status.message.as_deref(), Some("(Fail)"));
    }

    #[test]
    fn terminal_state_is_final() {
        let mut status = SourceStatus::loading("Vega");
        assert!(status.settle(&SourceOutcome::Blocked));
        assert!(!status.settle(&SourceOutcome::OkEmpty));
        assert_eq!(status.state, SourceState::Blocked);
        assert_eq!(status.message.as_deref(), Some("(Blocked)"));
    }
}
