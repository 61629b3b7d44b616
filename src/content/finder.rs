//! Equivalent content finder
//!
//! Resolves every URI the equivalence layer reports for a piece of
//! content. URIs that resolve to distinct content become equivalents;
//! URIs that resolve to nothing, or back to the subject itself, are
//! probable aliases (redirects or not-yet-ingested URIs). One bad
//! candidate never fails the whole merge — failures are logged and
//! skipped.

use super::merger::merge;
use super::model::Content;
use crate::equiv::EquivalenceResolver;
use crate::store::StoreResult;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors from resolving one candidate URI to content
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("content resolution failed: {0}")]
    Failed(String),
}

/// Looks content up by URI
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn find_by_uri(&self, uri: &str) -> Result<Option<Content>, ResolveError>;
}

/// What the finder learned about one piece of content
#[derive(Debug, Clone)]
pub struct EquivalentContent {
    /// Distinct content resolved from the equivalence set
    pub equivalent: Vec<Content>,
    /// Equivalent URIs that did not resolve to distinct content
    pub probable_aliases: BTreeSet<String>,
}

/// Finds and composes the multi-source view of one item
pub struct EquivalentContentFinder {
    equivalence: Arc<dyn EquivalenceResolver>,
    resolver: Arc<dyn ContentResolver>,
}

impl EquivalentContentFinder {
    pub fn new(
        equivalence: Arc<dyn EquivalenceResolver>,
        resolver: Arc<dyn ContentResolver>,
    ) -> Self {
        Self {
            equivalence,
            resolver,
        }
    }

    /// Resolve the content equivalent to `content`
    pub async fn equivalent_to(&self, content: &Content) -> StoreResult<EquivalentContent> {
        let subject = BTreeSet::from([content.uri().to_string()]);
        let uris = self.equivalence.equivalents_of(&subject).await?;

        let mut equivalent = Vec::new();
        let mut probable_aliases = BTreeSet::new();

        for uri in uris {
            match self.resolver.find_by_uri(&uri).await {
                Ok(Some(found)) if found.uri() != content.uri() => equivalent.push(found),
                Ok(_) => {
                    probable_aliases.insert(uri);
                }
                Err(e) => {
                    tracing::warn!(uri = %uri, error = %e, "skipping unresolvable equivalent");
                }
            }
        }

        Ok(EquivalentContent {
            equivalent,
            probable_aliases,
        })
    }

    /// Resolve equivalents and return the merged aggregate view
    pub async fn merged_view(&self, content: &Content) -> StoreResult<Content> {
        let found = self.equivalent_to(content).await?;
        Ok(merge(content, &found.equivalent, &found.probable_aliases))
    }
}
