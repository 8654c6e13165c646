//! Core search orchestrator: generation-tagged fan-out to every active site.
//!
//! Each submission allocates a new [`Generation`], snapshots the registry,
//! and spawns one task per active source under a per-generation parent task.
//! Outcomes are applied to the shared [`SessionState`] only if their
//! generation is still current at the moment of mutation; superseded
//! generations are additionally cancelled so their HTTP calls stop early.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::backend::SiteQuery;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::outcome::SourceOutcome;
use crate::registry::Registry;
use crate::types::{CategoryFilter, Source};

use super::events::HoundEvent;
use super::session::{Generation, SessionSnapshot, SessionState};

/// Returned by [`Orchestrator::submit_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryHandle {
    /// Generation allocated for the query.
    pub generation: Generation,
    /// Number of sources the query was dispatched to.
    pub sources: usize,
}

/// Concurrent multi-site search orchestrator.
///
/// Cheap to clone; clones share the same registry, session and event
/// channel. Methods that dispatch work must be called from within a tokio
/// runtime.
pub struct Orchestrator<Q> {
    inner: Arc<Inner<Q>>,
}

impl<Q> Clone for Orchestrator<Q> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Q> std::fmt::Debug for Orchestrator<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("generation", &self.current_generation())
            .field("sources", &self.registry().len())
            .finish_non_exhaustive()
    }
}

struct Inner<Q> {
    site_query: Q,
    registry: RwLock<Arc<Registry>>,
    generation: AtomicU64,
    finished: AtomicU64,
    shared: Mutex<Shared>,
    events: broadcast::Sender<HoundEvent>,
}

/// Everything mutated per outcome, behind one lock.
struct Shared {
    session: SessionState,
    cancel: CancellationToken,
}

impl<Q> Orchestrator<Q> {
    /// Create an orchestrator over `registry`.
    pub fn new(site_query: Q, registry: Registry, config: &SearchConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                site_query,
                registry: RwLock::new(Arc::new(registry)),
                generation: AtomicU64::new(0),
                finished: AtomicU64::new(0),
                shared: Mutex::new(Shared {
                    session: SessionState::new(),
                    cancel: CancellationToken::new(),
                }),
                events,
            }),
        }
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<HoundEvent> {
        self.inner.events.subscribe()
    }

    /// The current registry snapshot.
    pub fn registry(&self) -> Arc<Registry> {
        let guard = self
            .inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the registry wholesale.
    pub fn replace_registry(&self, registry: Registry) -> Arc<Registry> {
        self.update_registry(|_| registry)
    }

    /// Compute and install a new registry from the current one.
    ///
    /// `update` runs under the registry write lock, so concurrent updates
    /// serialise and readers see either the old or the new registry in full.
    /// Queries already in flight keep the snapshot they started with.
    pub fn update_registry<F>(&self, update: F) -> Arc<Registry>
    where
        F: FnOnce(&Registry) -> Registry,
    {
        let replaced = {
            let mut guard = self
                .inner
                .registry
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let next = Arc::new(update(&guard));
            *guard = Arc::clone(&next);
            next
        };
        tracing::info!(sources = replaced.len(), "registry replaced");
        let _ = self.inner.events.send(HoundEvent::RegistryReplaced {
            sources: replaced.len(),
        });
        replaced
    }

    /// The most recently allocated generation (`#0` before any query).
    pub fn current_generation(&self) -> Generation {
        Generation::new(self.inner.generation.load(Ordering::SeqCst))
    }

    /// Returns `true` once every task of `generation` has completed, or a
    /// later generation has.
    pub fn is_finished(&self, generation: Generation) -> bool {
        self.inner.finished.load(Ordering::SeqCst) >= generation.get()
    }

    /// Copy of the current session: generation, results, statuses.
    pub fn session_snapshot(&self) -> SessionSnapshot {
        self.inner.lock_shared().session.snapshot()
    }

    /// Apply one source outcome for `generation`.
    ///
    /// This is the path every dispatched task reports through; it is public
    /// so outcomes produced outside the orchestrator can be fed in the same
    /// way. Returns `false` if the outcome was discarded (stale generation,
    /// unknown address, or source already settled).
    pub fn on_outcome(&self, generation: Generation, address: &str, outcome: SourceOutcome) -> bool {
        self.inner.deliver(generation, address, outcome)
    }
}

impl<Q: SiteQuery + 'static> Orchestrator<Q> {
    /// Start a new query and return immediately.
    ///
    /// Allocates the next generation, which invalidates (and cancels) any
    /// previous one, marks every source active under `filter` as loading and
    /// queries them all concurrently. Progress is reported through
    /// [`Orchestrator::subscribe`] and [`Orchestrator::session_snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for empty or whitespace-only
    /// text; nothing changes in that case.
    pub fn submit_query(&self, text: &str, filter: CategoryFilter) -> Result<QueryHandle, SearchError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::InvalidQuery("query text is empty".into()));
        }

        let registry = self.registry();
        let sources = registry.active_sources(&filter);
        let cancel = CancellationToken::new();

        let generation = {
            let mut shared = self.inner.lock_shared();
            let generation =
                Generation::new(self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1);
            shared.cancel.cancel();
            shared.cancel = cancel.clone();
            let statuses = shared.session.begin(generation, text, &sources);
            let _ = self
                .inner
                .events
                .send(HoundEvent::QueryStarted { generation, statuses });
            generation
        };

        tracing::trace!(query = text, %generation, "query text");
        tracing::debug!(%generation, %filter, sources = sources.len(), "query dispatched");

        let handle = QueryHandle {
            generation,
            sources: sources.len(),
        };
        tokio::spawn(Arc::clone(&self.inner).run_generation(
            generation,
            Arc::from(text),
            sources,
            cancel,
        ));
        Ok(handle)
    }

    /// Submit a query and wait until every source of that generation has
    /// completed (or the generation was superseded), then return the session.
    ///
    /// # Errors
    ///
    /// Same as [`Orchestrator::submit_query`].
    pub async fn search_until_settled(
        &self,
        text: &str,
        filter: CategoryFilter,
    ) -> Result<SessionSnapshot, SearchError> {
        let mut events = self.subscribe();
        let handle = self.submit_query(text, filter)?;

        loop {
            match events.recv().await {
                Ok(HoundEvent::QueryFinished { generation, .. }) if generation == handle.generation => {
                    break;
                }
                Ok(HoundEvent::QueryStarted { generation, .. }) if generation > handle.generation => {
                    break;
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "event subscriber lagged");
                    if self.is_finished(handle.generation)
                        || self.current_generation() != handle.generation
                    {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        Ok(self.session_snapshot())
    }
}

impl<Q> Inner<Q> {
    fn lock_shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, generation: Generation, address: &str, outcome: SourceOutcome) -> bool {
        let label = outcome.label();
        let mut shared = self.lock_shared();
        let Some(settled) = shared.session.apply(generation, address, outcome) else {
            tracing::trace!(%generation, address, outcome = label, "outcome discarded");
            return false;
        };

        match settled.status.message.as_deref() {
            Some(message) if label == "error" => {
                tracing::warn!(%generation, address, message, "source query failed");
            }
            _ => tracing::debug!(
                %generation,
                address,
                outcome = label,
                appended = settled.appended.len(),
                "source settled"
            ),
        }

        // Sent under the lock so subscribers observe outcomes in the order
        // they were applied.
        let _ = self.events.send(HoundEvent::SourceSettled {
            generation,
            address: settled.address,
            status: settled.status,
            appended: settled.appended,
        });
        true
    }

    fn finish(&self, generation: Generation, total: usize) {
        let shared = self.lock_shared();
        if shared.session.generation() != generation {
            return;
        }
        self.finished.fetch_max(generation.get(), Ordering::SeqCst);
        let settled = shared.session.settled();
        tracing::info!(%generation, settled, total, "query finished");
        let _ = self.events.send(HoundEvent::QueryFinished {
            generation,
            settled,
            total,
        });
    }
}

impl<Q: SiteQuery + 'static> Inner<Q> {
    async fn run_generation(
        self: Arc<Self>,
        generation: Generation,
        text: Arc<str>,
        sources: Vec<Source>,
        cancel: CancellationToken,
    ) {
        let total = sources.len();
        let mut tasks = JoinSet::new();

        for source in sources {
            let inner = Arc::clone(&self);
            let text = Arc::clone(&text);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let response = tokio::select! {
                    () = cancel.cancelled() => return,
                    response = inner.site_query.query(&text, &source.address, &source.name) => response,
                };
                let outcome = SourceOutcome::classify(response, &source.name);
                inner.deliver(generation, &source.address, outcome);
            });
        }

        loop {
            tokio::select! {
                // Dropping the JoinSet aborts whatever is still running.
                () = cancel.cancelled() => {
                    tracing::debug!(%generation, "generation superseded");
                    return;
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok(())) => {}
                    Some(Err(err)) => {
                        tracing::warn!(%generation, error = %err, "source task did not complete");
                    }
                    None => break,
                },
            }
        }

        self.finish(generation, total);
    }
}
