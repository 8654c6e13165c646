//! Observer events broadcast by the orchestrator.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::status::SourceStatus;
use crate::types::SearchResult;

use super::session::Generation;

/// Progress notifications for subscribers.
///
/// Generation-scoped events are only ever sent for the generation that was
/// current when they were produced; a subscriber never sees an event for a
/// generation after the `QueryStarted` of a newer one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HoundEvent {
    /// A new generation started; every active source is `Loading`.
    QueryStarted {
        /// The new generation.
        generation: Generation,
        /// Initial status per active source address.
        statuses: BTreeMap<String, SourceStatus>,
    },
    /// One source settled. Its new results and its status change are
    /// delivered together.
    SourceSettled {
        /// Generation the outcome belongs to.
        generation: Generation,
        /// Source address.
        address: String,
        /// Terminal status.
        status: SourceStatus,
        /// Results newly appended to the aggregated set, in order.
        appended: Vec<SearchResult>,
    },
    /// Every query task of the generation has completed.
    QueryFinished {
        /// The finished generation.
        generation: Generation,
        /// Sources that reached a terminal state.
        settled: usize,
        /// Sources that were dispatched.
        total: usize,
    },
    /// The registry was replaced wholesale.
    RegistryReplaced {
        /// Number of sources in the new registry.
        sources: usize,
    },
}

impl HoundEvent {
    /// Generation the event is scoped to, if any.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Self::QueryStarted { generation, .. }
            | Self::SourceSettled { generation, .. }
            | Self::QueryFinished { generation, .. } => Some(*generation),
            Self::RegistryReplaced { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_accessor() {
        let event = HoundEvent::QueryFinished {
            generation: Generation::new(3),
            settled: 2,
            total: 2,
        };
        assert_eq!(event.generation(), Some(Generation::new(3)));
        assert_eq!(HoundEvent::RegistryReplaced { sources: 4 }.generation(), None);
    }

    #[test]
    fn serializes_with_event_tag() {
        let event = HoundEvent::RegistryReplaced { sources: 4 };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "registry_replaced");
        assert_eq!(json["sources"], 4);
    }
}
