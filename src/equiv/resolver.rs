//! Equivalence resolution seam
//!
//! Consumers of resolved equivalence (the content merger, index
//! writers) depend on this trait rather than on a storage generation.
//! Both the legacy bounded store and the eager-closure entry store
//! implement it; the eager closure is the authoritative generation.

use super::bounded::BoundedEquivalenceStore;
use crate::store::{LookupEntryStore, StoreResult};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Resolves a set of URIs to the URIs equivalent to them
///
/// The result excludes the query set itself.
#[async_trait]
pub trait EquivalenceResolver: Send + Sync {
    async fn equivalents_of(&self, uris: &BTreeSet<String>) -> StoreResult<BTreeSet<String>>;
}

#[async_trait]
impl EquivalenceResolver for BoundedEquivalenceStore {
    async fn equivalents_of(&self, uris: &BTreeSet<String>) -> StoreResult<BTreeSet<String>> {
        BoundedEquivalenceStore::equivalents_of(self, uris)
    }
}

/// Closure read over the lookup entry store
///
/// Each queried URI resolves to its entry; the entry's precomputed
/// `equivalents` set is the whole answer — no traversal at read time.
pub struct LookupClosureResolver {
    store: Arc<dyn LookupEntryStore>,
}

impl LookupClosureResolver {
    pub fn new(store: Arc<dyn LookupEntryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EquivalenceResolver for LookupClosureResolver {
    async fn equivalents_of(&self, uris: &BTreeSet<String>) -> StoreResult<BTreeSet<String>> {
        let mut resolved: BTreeSet<String> = BTreeSet::new();
        for uri in uris {
            if let Some(entry) = self.store.entry_for(uri).await? {
                resolved.extend(entry.equivalents.iter().map(|r| r.uri.clone()));
            }
        }
        Ok(resolved.difference(uris).cloned().collect())
    }
}
