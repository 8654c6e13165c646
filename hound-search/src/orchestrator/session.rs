//! Generation-scoped session state: the result set plus the status map.
//!
//! [`SessionState`] is plain data. The orchestrator keeps it behind one
//! mutex and only ever mutates it through [`SessionState::begin`] and
//! [`SessionState::apply`], which is where the generation gate lives.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::SourceOutcome;
use crate::status::SourceStatus;
use crate::types::{SearchResult, Source};

use super::dedup::ResultSet;

/// Monotonic identifier of one query submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Wrap a raw counter value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The state change produced by one accepted outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledSource {
    /// Address of the source that settled.
    pub address: String,
    /// Its new (terminal) status.
    pub status: SourceStatus,
    /// Results that were new to the aggregated set.
    pub appended: Vec<SearchResult>,
}

/// Point-in-time copy of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Generation the snapshot belongs to (`#0` before any query).
    pub generation: Generation,
    /// Query text of that generation.
    pub query: String,
    /// Aggregated results in arrival order.
    pub results: Vec<SearchResult>,
    /// Status per active source address.
    pub statuses: BTreeMap<String, SourceStatus>,
}

impl SessionSnapshot {
    /// Number of sources that have settled.
    pub fn settled(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| s.state.is_terminal())
            .count()
    }
}

/// Result set and status map of the current generation.
#[derive(Debug, Default)]
pub struct SessionState {
    generation: Generation,
    query: String,
    results: ResultSet,
    statuses: BTreeMap<String, SourceStatus>,
}

impl SessionState {
    /// Idle state before the first query.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Start `generation`, discarding everything from the previous one.
    ///
    /// Every source in `sources` starts `Loading`. Returns the initial
    /// status map.
    pub fn begin(
        &mut self,
        generation: Generation,
        query: &str,
        sources: &[Source],
    ) -> BTreeMap<String, SourceStatus> {
        self.generation = generation;
        self.query = query.to_string();
        self.results.clear();
        self.statuses = sources
            .iter()
            .map(|source| (source.address.clone(), SourceStatus::loading(&source.name)))
            .collect();
        self.statuses.clone()
    }

    /// Apply one source outcome.
    ///
    /// Returns `None` without touching anything if `generation` is not the
    /// current one, the address is not part of it, or the source has already
    /// settled. Otherwise the results are merged and the status settled in one
    /// step.
    pub fn apply(
        &mut self,
        generation: Generation,
        address: &str,
        outcome: SourceOutcome,
    ) -> Option<SettledSource> {
        if generation != self.generation {
            return None;
        }
        let status = self.statuses.get_mut(address)?;
        if status.state.is_terminal() {
            return None;
        }

        status.settle(&outcome);
        let status = status.clone();
        let appended = match outcome {
            SourceOutcome::Ok(results) => self.results.extend_unique(results),
            _ => Vec::new(),
        };

        Some(SettledSource {
            address: address.to_string(),
            status,
            appended,
        })
    }

    /// Number of settled sources in the current generation.
    pub fn settled(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| s.state.is_terminal())
            .count()
    }

    /// Copy out the current session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            query: self.query.clone(),
            results: self.results.as_slice().to_vec(),
            statuses: self.statuses.clone(),
        }
    }
}
