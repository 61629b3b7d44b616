//! EquivalenceSummary: transient staging record
//!
//! Produced by the external scoring/matching process and consumed when
//! promoting candidates into the canonical graph. Overwritten per
//! ingestion cycle; disposable.

use super::reference::{ContentRef, Publisher};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Mid-pipeline staging record for one subject's candidate equivalences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceSummary {
    /// URI of the content the summary describes
    pub subject: String,
    /// Container URI when the subject is a child item, queryable via a secondary index
    pub parent: Option<String>,
    /// Candidate URIs surfaced by the matcher, not yet committed
    pub candidates: BTreeSet<String>,
    /// The strongest candidate per publisher
    #[serde(rename = "equivalentsByPublisher")]
    pub equivalents: BTreeMap<Publisher, ContentRef>,
}

impl EquivalenceSummary {
    pub fn new(subject: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            parent,
            candidates: BTreeSet::new(),
            equivalents: BTreeMap::new(),
        }
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates.extend(candidates.into_iter().map(Into::into));
        self
    }

    pub fn with_equivalent(mut self, publisher: Publisher, content: ContentRef) -> Self {
        self.equivalents.insert(publisher, content);
        self
    }
}
