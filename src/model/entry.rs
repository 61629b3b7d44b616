//! LookupEntry: the canonical identity record
//!
//! One logical instance per distinct content identity, stored under
//! every URI that can resolve to it. The `equivalents` set is the full
//! closure of the entry's connected component, including the entry's
//! own ref; `direct_equivalents` and `explicit_equivalents` hold only
//! the edges to *other* entries.

use super::reference::{Alias, ContentRef, LookupRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// The canonical identity record for one piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    /// Canonical/primary URI
    pub uri: String,
    /// Opaque numeric identifier, assigned once, stable for the entry's lifetime
    pub id: i64,
    /// The ref for this entry's own source
    #[serde(rename = "self")]
    pub self_ref: LookupRef,
    /// Every URI that resolves to this entry, including `uri` — the physical storage keys
    pub alias_uris: BTreeSet<String>,
    /// Namespaced external identifiers, distinct from URIs
    pub aliases: BTreeSet<Alias>,
    /// Edges asserted by the most recent write, scoped per contributing publisher
    pub direct_equivalents: BTreeSet<LookupRef>,
    /// Curated edges that automatic recomputation must never silently drop
    pub explicit_equivalents: BTreeSet<LookupRef>,
    /// The full closure, including this entry's own ref
    pub equivalents: BTreeSet<LookupRef>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl LookupEntry {
    /// Create a fresh entry for a described content item
    ///
    /// The id comes from the id-generation capability and is fixed for
    /// the entry's lifetime. A new entry has no direct or explicit
    /// edges; its closure is just itself.
    pub fn for_ref(content: &ContentRef, id: i64) -> Self {
        let self_ref = LookupRef::new(&content.uri, id, content.publisher, content.category);
        let now = Utc::now();
        Self {
            uri: content.uri.clone(),
            id,
            equivalents: BTreeSet::from([self_ref.clone()]),
            self_ref,
            alias_uris: BTreeSet::from([content.uri.clone()]),
            aliases: BTreeSet::new(),
            direct_equivalents: BTreeSet::new(),
            explicit_equivalents: BTreeSet::new(),
            created: now,
            updated: now,
        }
    }

    /// Add alias URIs under which the entry is also stored
    pub fn with_alias_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_uris.extend(uris.into_iter().map(Into::into));
        self
    }

    /// Add namespaced external identifiers
    pub fn with_aliases<I>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = Alias>,
    {
        self.aliases.extend(aliases);
        self
    }

    /// Replace the direct equivalence edges
    pub fn with_direct_equivalents(mut self, direct: BTreeSet<LookupRef>) -> Self {
        self.direct_equivalents = direct;
        self
    }

    /// Replace the explicit (curated) equivalence edges
    pub fn with_explicit_equivalents(mut self, explicit: BTreeSet<LookupRef>) -> Self {
        self.explicit_equivalents = explicit;
        self
    }

    /// Replace the closure set
    pub fn with_equivalents(mut self, equivalents: BTreeSet<LookupRef>) -> Self {
        self.equivalents = equivalents;
        self
    }

    /// The union of direct and explicit edges — what closure traversal follows
    pub fn outgoing(&self) -> BTreeSet<LookupRef> {
        self.direct_equivalents
            .union(&self.explicit_equivalents)
            .cloned()
            .collect()
    }

    /// Stable hash of the entry's identity-bearing content
    ///
    /// Excludes `created` and `updated`, so two entries that differ only
    /// in timestamps hash equal. Used to skip redundant physical writes
    /// and the downstream signals they would trigger.
    pub fn write_hash(&self) -> String {
        let mut hasher = Sha256::new();
        feed_str(&mut hasher, &self.uri);
        hasher.update(self.id.to_be_bytes());
        feed_ref(&mut hasher, &self.self_ref);
        for uri in &self.alias_uris {
            feed_str(&mut hasher, uri);
        }
        hasher.update([0xff]);
        for alias in &self.aliases {
            feed_str(&mut hasher, &alias.namespace);
            feed_str(&mut hasher, &alias.value);
        }
        hasher.update([0xff]);
        for r in &self.direct_equivalents {
            feed_ref(&mut hasher, r);
        }
        hasher.update([0xff]);
        for r in &self.explicit_equivalents {
            feed_ref(&mut hasher, r);
        }
        hasher.update([0xff]);
        for r in &self.equivalents {
            feed_ref(&mut hasher, r);
        }
        hex::encode(hasher.finalize())
    }
}

fn feed_str(hasher: &mut Sha256, s: &str) {
    hasher.update(s.as_bytes());
    // field separator — keeps adjacent strings from colliding
    hasher.update([0x00]);
}

fn feed_ref(hasher: &mut Sha256, r: &LookupRef) {
    feed_str(hasher, &r.uri);
    hasher.update(r.id.to_be_bytes());
    feed_str(hasher, r.publisher.key());
    feed_str(hasher, r.category.key());
}
