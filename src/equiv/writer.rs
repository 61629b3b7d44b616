//! Transitive lookup writer
//!
//! Folds an equivalence assertion into the canonical-identity graph as
//! an explicit reconciliation pass: affected entries are gathered into
//! an arena keyed by id, direct edges are recomputed under the
//! asserting publishers' scope, closures are recomputed with a
//! visited-set traversal, and only entries whose write hash changed
//! are persisted and signalled downstream.
//!
//! The multi-entry write is non-transactional on every backend. A
//! partial failure leaves the graph transiently inconsistent but not
//! corrupt: re-asserting the same or a superseding equivalence is
//! deterministic and idempotent, so convergence is the recovery model.

use super::hooks::{NoopAudit, NoopPropagator, UpdatePropagator, WriteAudit};
use crate::ids::IdGenerator;
use crate::messages::EntityUpdatedMessage;
use crate::model::{ContentRef, LookupEntry, LookupRef, Publisher};
use crate::store::{LookupEntryStore, StoreError};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default deadline across one whole logical write
const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Errors from a logical lookup write
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("write deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// What one `write_lookup` call did
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Canonical URIs of entries that were persisted
    pub written: Vec<String>,
    /// Entries recomputed to an identical state and left untouched
    pub unchanged: usize,
}

/// Entries gathered for one reconciliation pass, keyed by entry id
///
/// `baseline` holds each entry's pre-image write hash; entries created
/// during the pass get an empty baseline so they always persist.
#[derive(Default)]
struct Arena {
    entries: BTreeMap<i64, LookupEntry>,
    by_uri: BTreeMap<String, i64>,
    baseline: BTreeMap<i64, String>,
}

impl Arena {
    fn insert(&mut self, entry: LookupEntry, baseline: String) -> i64 {
        let id = entry.id;
        self.baseline.insert(id, baseline);
        for alias in &entry.alias_uris {
            self.by_uri.insert(alias.clone(), id);
        }
        self.by_uri.insert(entry.uri.clone(), id);
        self.entries.insert(id, entry);
        id
    }

    fn id_for_uri(&self, uri: &str) -> Option<i64> {
        self.by_uri.get(uri).copied()
    }
}

/// The merge algorithm over a lookup entry store
pub struct TransitiveLookupWriter {
    store: Arc<dyn LookupEntryStore>,
    ids: Arc<dyn IdGenerator>,
    audit: Arc<dyn WriteAudit>,
    propagator: Arc<dyn UpdatePropagator>,
    deadline: Duration,
}

impl TransitiveLookupWriter {
    pub fn new(store: Arc<dyn LookupEntryStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            ids,
            audit: Arc::new(NoopAudit),
            propagator: Arc::new(NoopPropagator),
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn WriteAudit>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_propagator(mut self, propagator: Arc<dyn UpdatePropagator>) -> Self {
        self.propagator = propagator;
        self
    }

    /// Bound the whole multi-entry write with a single deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Assert that `subject` is equivalent to each of `equivalents`
    ///
    /// The assertion is authoritative only for `publishers`: direct
    /// edges sourced from other publishers are left untouched. Entries
    /// absent from the store are created with ids from the injected
    /// generator. Calling twice with identical arguments persists
    /// nothing the second time.
    pub async fn write_lookup(
        &self,
        subject: &ContentRef,
        equivalents: &[ContentRef],
        publishers: &BTreeSet<Publisher>,
    ) -> Result<WriteOutcome, WriteError> {
        match tokio::time::timeout(
            self.deadline,
            self.reconcile(subject, equivalents, publishers),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(WriteError::DeadlineExceeded(self.deadline)),
        }
    }

    async fn reconcile(
        &self,
        subject: &ContentRef,
        equivalents: &[ContentRef],
        publishers: &BTreeSet<Publisher>,
    ) -> Result<WriteOutcome, WriteError> {
        let mut arena = Arena::default();

        let (subject_id, subject_ref) = self.load_or_create(&mut arena, subject).await?;

        let mut partner_ids = Vec::with_capacity(equivalents.len());
        let mut partner_refs: BTreeSet<LookupRef> = BTreeSet::new();
        for partner in equivalents {
            let (id, self_ref) = self.load_or_create(&mut arena, partner).await?;
            if id != subject_id {
                partner_ids.push(id);
                partner_refs.insert(self_ref);
            }
        }

        // Recompute the subject's direct edges under the asserting
        // publishers' scope.
        let old_direct = match arena.entries.get(&subject_id) {
            Some(entry) => entry.direct_equivalents.clone(),
            None => BTreeSet::new(),
        };
        let mut new_direct: BTreeSet<LookupRef> = old_direct
            .iter()
            .filter(|r| !publishers.contains(&r.publisher))
            .cloned()
            .collect();
        new_direct.extend(partner_refs.iter().cloned());

        if let Some(entry) = arena.entries.get_mut(&subject_id) {
            entry.direct_equivalents = new_direct;
        }

        // Edges this assertion supersedes: previously direct under the
        // given scope, no longer asserted.
        let dropped: Vec<LookupRef> = old_direct
            .iter()
            .filter(|r| publishers.contains(&r.publisher) && !partner_refs.contains(r))
            .cloned()
            .collect();

        // Mirror the assertion: partners gain a backlink to the
        // subject, superseded partners lose theirs.
        for id in &partner_ids {
            if let Some(entry) = arena.entries.get_mut(id) {
                entry.direct_equivalents.insert(subject_ref.clone());
            }
        }
        for r in &dropped {
            if let Some(id) = self.load_ref(&mut arena, r).await? {
                if let Some(entry) = arena.entries.get_mut(&id) {
                    entry.direct_equivalents.remove(&subject_ref);
                }
            }
        }

        // Recompute the subject's component, then each component a
        // superseded partner fell into.
        self.assign_closure(&mut arena, subject_id).await?;
        for r in &dropped {
            if let Some(id) = arena.id_for_uri(&r.uri) {
                self.assign_closure(&mut arena, id).await?;
            }
        }

        self.persist_changed(&mut arena).await
    }

    /// Persist every arena entry whose write hash moved off its
    /// baseline, signalling hooks per successful store.
    async fn persist_changed(&self, arena: &mut Arena) -> Result<WriteOutcome, WriteError> {
        let mut written = Vec::new();
        let mut unchanged = 0;
        let now = Utc::now();

        for (id, entry) in arena.entries.iter_mut() {
            let baseline = arena.baseline.get(id).map(String::as_str).unwrap_or("");
            if entry.write_hash() == baseline {
                unchanged += 1;
                continue;
            }
            entry.updated = now;
            self.store.store(entry).await?;
            self.audit.record_write(entry);
            self.propagator
                .entity_updated(EntityUpdatedMessage::for_entry(entry));
            written.push(entry.uri.clone());
        }

        tracing::debug!(
            written = written.len(),
            unchanged,
            "lookup reconciliation complete"
        );
        Ok(WriteOutcome { written, unchanged })
    }

    async fn load_or_create(
        &self,
        arena: &mut Arena,
        content: &ContentRef,
    ) -> Result<(i64, LookupRef), WriteError> {
        if let Some(id) = arena.id_for_uri(&content.uri) {
            if let Some(entry) = arena.entries.get(&id) {
                return Ok((id, entry.self_ref.clone()));
            }
        }
        // Loaded entries diff against their stored image; created ones
        // get an empty baseline so they always persist.
        let (entry, baseline) = match self.store.entry_for(&content.uri).await? {
            Some(found) => {
                let baseline = found.write_hash();
                (found, baseline)
            }
            None => (
                LookupEntry::for_ref(content, self.ids.next_id()),
                String::new(),
            ),
        };
        let self_ref = entry.self_ref.clone();
        Ok((arena.insert(entry, baseline), self_ref))
    }

    /// Bring the entry a ref points at into the arena, if it exists
    async fn load_ref(
        &self,
        arena: &mut Arena,
        r: &LookupRef,
    ) -> Result<Option<i64>, WriteError> {
        if let Some(id) = arena.id_for_uri(&r.uri) {
            return Ok(Some(id));
        }
        match self.store.entry_for(&r.uri).await? {
            Some(entry) => {
                let baseline = entry.write_hash();
                Ok(Some(arena.insert(entry, baseline)))
            }
            None => Ok(None),
        }
    }

    /// Traverse the component reachable from `origin` through
    /// direct ∪ explicit edges and give every member the component's
    /// full ref set (including self) as its closure.
    ///
    /// The visited set guarantees termination on cycles. Refs whose
    /// entries do not resolve are not traversed and contribute nothing
    /// to the closure.
    async fn assign_closure(&self, arena: &mut Arena, origin: i64) -> Result<(), WriteError> {
        let mut component: BTreeSet<i64> = BTreeSet::new();
        let mut frontier: Vec<i64> = vec![origin];

        while let Some(id) = frontier.pop() {
            if !component.insert(id) {
                continue;
            }
            let outgoing = match arena.entries.get(&id) {
                Some(entry) => entry.outgoing(),
                None => continue,
            };
            for r in outgoing {
                if let Some(next) = self.load_ref(arena, &r).await? {
                    if !component.contains(&next) {
                        frontier.push(next);
                    }
                }
            }
        }

        let refs: BTreeSet<LookupRef> = component
            .iter()
            .filter_map(|id| arena.entries.get(id).map(|e| e.self_ref.clone()))
            .collect();

        for id in &component {
            if let Some(entry) = arena.entries.get_mut(id) {
                entry.equivalents = refs.clone();
            }
        }
        Ok(())
    }
}
