//! Registry synchronisation: merge a discovered catalog into the current one.
//!
//! Brand name (case-insensitive) is the logical identity of a site. Sites
//! move between domains constantly, so the same brand routinely shows up
//! under several addresses; the merge keeps exactly one address per brand.
//!
//! # Algorithm
//!
//! 1. Collapse duplicate brands inside the discovered catalog, keeping the
//!    preferred address ([`crate::address::preference`]).
//! 2. Index both sides by brand.
//! 3. Keep the current brands the discovered catalog does not mention.
//! 4. Rebuild the address-keyed registry from the kept current brands, then
//!    the discovered ones, so a discovered entry also wins when both sides
//!    hold the same address under different brand names.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::address::preference;
use crate::backend::{RegistryStore, SiteDiscovery};
use crate::error::SearchError;
use crate::orchestrator::Orchestrator;
use crate::registry::Registry;
use crate::types::Source;

/// Collapse same-brand entries to one source per brand.
///
/// Groups by case-insensitive brand name and keeps the preferred address
/// of each group; the others are dropped.
pub fn dedup_by_brand(registry: &Registry) -> BTreeMap<String, Source> {
    let mut by_brand: BTreeMap<String, Source> = BTreeMap::new();
    for source in registry.iter() {
        match by_brand.entry(source.brand_key()) {
            Entry::Vacant(slot) => {
                slot.insert(source.clone());
            }
            Entry::Occupied(mut slot) => {
                if preference(&source.address, &slot.get().address).is_lt() {
                    tracing::trace!(
                        brand = %source.name,
                        kept = %source.address,
                        dropped = %slot.get().address,
                        "duplicate brand address"
                    );
                    slot.insert(source.clone());
                }
            }
        }
    }
    by_brand
}

/// Merge `discovered` into `current`.
///
/// Pure: neither input is modified and nothing is persisted. Brands present
/// on both sides take the discovered address and category tags; brands only
/// in `current` are kept unchanged unless a discovered source occupies
/// their address.
pub fn merge(current: &Registry, discovered: &Registry) -> Registry {
    let discovered = dedup_by_brand(discovered);
    let retained = dedup_by_brand(current)
        .into_iter()
        .filter(|(brand, _)| !discovered.contains_key(brand))
        .map(|(_, source)| source)
        .collect::<Vec<_>>();
    retained.into_iter().chain(discovered.into_values()).collect()
}

/// Summary of a completed synchronisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Sources before the merge.
    pub before: usize,
    /// Sources in the discovered catalog.
    pub discovered: usize,
    /// Sources after the merge.
    pub after: usize,
    /// Whether the new registry was saved.
    pub persisted: bool,
}

/// Run discovery, merge the result into the orchestrator's registry and
/// persist it.
///
/// The merge is applied atomically with respect to concurrent readers; an
/// in-flight query keeps using the registry it started with. A failed save
/// does not undo the in-memory replacement; it is logged and reported
/// through [`SyncReport::persisted`].
///
/// # Errors
///
/// Returns [`SearchError::Sync`] if discovery fails. The registry and the
/// persisted state are left untouched in that case.
pub async fn synchronize<Q, D, S>(
    orchestrator: &Orchestrator<Q>,
    discovery: &D,
    store: &S,
) -> Result<SyncReport, SearchError>
where
    D: SiteDiscovery,
    S: RegistryStore,
{
    let discovered = discovery.discover().await.map_err(|err| match err {
        SearchError::Sync(_) => err,
        other => SearchError::Sync(other.to_string()),
    })?;

    let mut before = 0;
    let merged = orchestrator.update_registry(|current| {
        before = current.len();
        merge(current, &discovered)
    });

    let persisted = match store.save(&merged) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "failed to persist synchronised registry");
            false
        }
    };

    let report = SyncReport {
        before,
        discovered: discovered.len(),
        after: merged.len(),
        persisted,
    };
    tracing::info!(
        before = report.before,
        discovered = report.discovered,
        after = report.after,
        persisted,
        "site registry synchronised"
    );
    Ok(report)
}
