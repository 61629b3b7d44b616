//! In-memory lookup store
//!
//! Alias-keyed concurrent map honoring the same contract as the
//! persistent backends. The test and wiring backend.

use super::traits::{LookupEntryStore, StoreResult};
use crate::model::LookupEntry;
use async_trait::async_trait;
use dashmap::DashMap;

/// Concurrent in-memory store
#[derive(Debug, Default)]
pub struct MemoryLookupStore {
    entries: DashMap<String, LookupEntry>,
}

impl MemoryLookupStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of physical records (one per alias)
    pub fn record_count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl LookupEntryStore for MemoryLookupStore {
    async fn store(&self, entry: &LookupEntry) -> StoreResult<()> {
        for alias in &entry.alias_uris {
            self.entries.insert(alias.clone(), entry.clone());
        }
        Ok(())
    }

    async fn entry_for(&self, identifier: &str) -> StoreResult<Option<LookupEntry>> {
        Ok(self.entries.get(identifier).map(|r| r.clone()))
    }

    async fn entries_for_canonical_uris(&self, uris: &[String]) -> StoreResult<Vec<LookupEntry>> {
        Ok(uris
            .iter()
            .filter_map(|uri| self.entries.get(uri).map(|r| r.clone()))
            .collect())
    }

    async fn ensure_lookup(&self, entry: &LookupEntry) -> StoreResult<bool> {
        if self.entries.contains_key(&entry.uri) {
            return Ok(false);
        }
        self.store(entry).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentCategory, ContentRef, Publisher};

    #[tokio::test]
    async fn test_fan_out_one_record_per_alias() {
        let store = MemoryLookupStore::new();
        let entry = LookupEntry::for_ref(
            &ContentRef::new("http://five.tv/shows/9", Publisher::Five, ContentCategory::Container),
            3,
        )
        .with_alias_uris(["http://five.tv/9", "http://demand5.com/shows/9"]);

        store.store(&entry).await.unwrap();
        assert_eq!(store.record_count(), 3);
        for alias in &entry.alias_uris {
            assert_eq!(store.entry_for(alias).await.unwrap().unwrap(), entry);
        }
    }
}
