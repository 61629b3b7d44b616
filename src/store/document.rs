//! Document-layout lookup store
//!
//! One logical collection, one row per alias URI, each row holding the
//! full entry document. Reads resolve any alias in a single keyed
//! lookup; writes fan out to every alias. The row shape keeps the
//! interop field names (`_id`, `aid`, `self`, `aliases`, `ids`,
//! `direct`, `equivs`, `explicit`, `created`, `updated`) so documents
//! stay readable by the other backend during a migration window.

use super::traits::{LookupEntryStore, StoreResult};
use crate::model::{Alias, ContentCategory, LookupEntry, LookupRef, Publisher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

/// Embedded lookup ref in the interop document shape
#[derive(Debug, Serialize, Deserialize)]
struct RefDoc {
    id: String,
    aid: i64,
    publisher: Publisher,
    #[serde(rename = "type")]
    category: ContentCategory,
}

impl RefDoc {
    fn from_ref(r: &LookupRef) -> Self {
        Self {
            id: r.uri.clone(),
            aid: r.id,
            publisher: r.publisher,
            category: r.category,
        }
    }

    fn into_ref(self) -> LookupRef {
        LookupRef::new(self.id, self.aid, self.publisher, self.category)
    }
}

/// The per-alias row document
#[derive(Debug, Serialize, Deserialize)]
struct EntryDoc {
    /// The alias URI this row is stored under
    #[serde(rename = "_id")]
    id: String,
    aid: i64,
    /// Carries the canonical URI as its `id`
    #[serde(rename = "self")]
    self_ref: RefDoc,
    aliases: Vec<String>,
    ids: Vec<Alias>,
    direct: Vec<RefDoc>,
    equivs: Vec<RefDoc>,
    explicit: Vec<RefDoc>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl EntryDoc {
    fn from_entry(entry: &LookupEntry, key_alias: &str) -> Self {
        Self {
            id: key_alias.to_string(),
            aid: entry.id,
            self_ref: RefDoc::from_ref(&entry.self_ref),
            aliases: entry.alias_uris.iter().cloned().collect(),
            ids: entry.aliases.iter().cloned().collect(),
            direct: entry.direct_equivalents.iter().map(RefDoc::from_ref).collect(),
            equivs: entry.equivalents.iter().map(RefDoc::from_ref).collect(),
            explicit: entry.explicit_equivalents.iter().map(RefDoc::from_ref).collect(),
            created: entry.created,
            updated: entry.updated,
        }
    }

    fn into_entry(self) -> LookupEntry {
        let self_ref = self.self_ref.into_ref();
        LookupEntry {
            uri: self_ref.uri.clone(),
            id: self.aid,
            self_ref,
            alias_uris: self.aliases.into_iter().collect(),
            aliases: self.ids.into_iter().collect(),
            direct_equivalents: self.direct.into_iter().map(RefDoc::into_ref).collect(),
            explicit_equivalents: self.explicit.into_iter().map(RefDoc::into_ref).collect(),
            equivalents: self.equivs.into_iter().map(RefDoc::into_ref).collect(),
            created: self.created,
            updated: self.updated,
        }
    }
}

/// Document-layout store over an embedded database
///
/// Thread-safe via internal mutex on the connection, matching how the
/// platform's document driver pools a shared handle.
pub struct DocumentLookupStore {
    conn: Mutex<Connection>,
}

impl DocumentLookupStore {
    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS lookup (
                _id TEXT PRIMARY KEY,
                aid INTEGER NOT NULL,
                doc TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_lookup_aid ON lookup(aid);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn store_sync(&self, entry: &LookupEntry) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        // One physical row per alias, identical content under each key.
        for alias in &entry.alias_uris {
            let doc = serde_json::to_string(&EntryDoc::from_entry(entry, alias))?;
            conn.execute(
                r#"
                INSERT INTO lookup (_id, aid, doc)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(_id) DO UPDATE SET
                    aid = excluded.aid,
                    doc = excluded.doc
                "#,
                params![alias, entry.id, doc],
            )?;
        }
        Ok(())
    }

    fn entry_for_sync(&self, identifier: &str) -> StoreResult<Option<LookupEntry>> {
        let conn = self.conn.lock().unwrap();
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM lookup WHERE _id = ?1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;

        let Some(doc) = doc else {
            return Ok(None);
        };

        let parsed: EntryDoc = serde_json::from_str(&doc)?;
        Ok(Some(parsed.into_entry()))
    }

    fn exists_sync(&self, identifier: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        // Minimal projection — the existence check must not pull the document.
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM lookup WHERE _id = ?1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl LookupEntryStore for DocumentLookupStore {
    async fn store(&self, entry: &LookupEntry) -> StoreResult<()> {
        self.store_sync(entry)
    }

    async fn entry_for(&self, identifier: &str) -> StoreResult<Option<LookupEntry>> {
        self.entry_for_sync(identifier)
    }

    async fn entries_for_canonical_uris(&self, uris: &[String]) -> StoreResult<Vec<LookupEntry>> {
        let mut entries = Vec::with_capacity(uris.len());
        for uri in uris {
            if let Some(entry) = self.entry_for_sync(uri)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn ensure_lookup(&self, entry: &LookupEntry) -> StoreResult<bool> {
        if self.exists_sync(&entry.uri)? {
            return Ok(false);
        }
        self.store_sync(entry)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentRef;
    use std::collections::BTreeSet;

    fn entry_with_aliases() -> LookupEntry {
        LookupEntry::for_ref(
            &ContentRef::new(
                "http://bbc.co.uk/programmes/b006m86d",
                Publisher::Bbc,
                ContentCategory::Container,
            ),
            101,
        )
        .with_alias_uris([
            "http://bbc.co.uk/b006m86d",
            "http://www.bbc.co.uk/programmes/b006m86d",
        ])
        .with_aliases([Alias::new("gb:bbc:pid", "b006m86d")])
    }

    #[tokio::test]
    async fn test_alias_fan_out() {
        let store = DocumentLookupStore::open_in_memory().unwrap();
        let entry = entry_with_aliases();
        store.store(&entry).await.unwrap();

        // Every alias resolves independently to identical content
        for alias in &entry.alias_uris {
            let found = store.entry_for(alias).await.unwrap().unwrap();
            assert_eq!(found, entry);
        }
    }

    #[tokio::test]
    async fn test_missing_identifier_is_absent_not_error() {
        let store = DocumentLookupStore::open_in_memory().unwrap();
        let found = store.entry_for("http://nowhere/1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_ensure_lookup_skips_existing_row() {
        let store = DocumentLookupStore::open_in_memory().unwrap();
        let entry = entry_with_aliases();

        assert!(store.ensure_lookup(&entry).await.unwrap());

        // Second ensure must see the row and not write; a differing
        // closure on the second call proves the write was skipped.
        let altered = entry.clone().with_equivalents(BTreeSet::new());
        assert!(!store.ensure_lookup(&altered).await.unwrap());

        let found = store.entry_for(&entry.uri).await.unwrap().unwrap();
        assert_eq!(found.equivalents, entry.equivalents);
    }

    #[tokio::test]
    async fn test_batched_canonical_lookup() {
        let store = DocumentLookupStore::open_in_memory().unwrap();
        let a = LookupEntry::for_ref(
            &ContentRef::new("http://itv.com/1", Publisher::Itv, ContentCategory::Item),
            1,
        );
        let b = LookupEntry::for_ref(
            &ContentRef::new("http://five.tv/2", Publisher::Five, ContentCategory::Item),
            2,
        );
        store.store(&a).await.unwrap();
        store.store(&b).await.unwrap();

        let found = store
            .entries_for_canonical_uris(&[
                a.uri.clone(),
                "http://nowhere/3".to_string(),
                b.uri.clone(),
            ])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_keeps_self_in_closure() {
        let store = DocumentLookupStore::open_in_memory().unwrap();
        let entry = entry_with_aliases();
        store.store(&entry).await.unwrap();

        let found = store.entry_for(&entry.uri).await.unwrap().unwrap();
        assert!(found.equivalents.contains(&found.self_ref));
    }
}
