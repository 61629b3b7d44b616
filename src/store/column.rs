//! Column-layout lookup store
//!
//! A canonical row keyed by primary URI holds a codec-encoded entry
//! blob; a separate inverted index maps every alias to the canonical
//! key. The two are maintained by independent mutations — deliberately
//! not atomic. A crash between them leaves a dangling or missing index
//! entry, which the next store of the same entry repairs.
//!
//! Every operation runs on the blocking pool and is awaited under a
//! bounded `request_timeout`. Timeout, connection failure, and codec
//! failure all surface as the single opaque
//! `StoreError::PersistenceFailed` kind; nothing is retried internally.

use super::traits::{LookupEntryStore, StoreError, StoreResult};
use crate::model::LookupEntry;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serializer for the canonical row blob
///
/// Injected per store instance so a migration window can run two
/// stores with different encodings side by side.
#[derive(Debug, Clone, Default)]
pub struct EntryCodec;

impl EntryCodec {
    pub fn json() -> Self {
        Self
    }

    pub fn encode(&self, entry: &LookupEntry) -> Result<String, serde_json::Error> {
        serde_json::to_string(entry)
    }

    pub fn decode(&self, raw: &str) -> Result<LookupEntry, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Column-layout store over an embedded database
pub struct ColumnLookupStore {
    conn: Arc<Mutex<Connection>>,
    codec: EntryCodec,
    request_timeout: Duration,
}

impl ColumnLookupStore {
    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            -- Canonical rows: one per entry, keyed by primary URI
            CREATE TABLE IF NOT EXISTS lookup_rows (
                uri TEXT PRIMARY KEY,
                entry TEXT NOT NULL
            );

            -- Inverted secondary index: alias -> canonical key
            CREATE TABLE IF NOT EXISTS lookup_aliases (
                alias TEXT PRIMARY KEY,
                canonical TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_lookup_aliases_canonical
                ON lookup_aliases(canonical);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Open or create a store at the given path
    pub fn open(
        path: impl AsRef<Path>,
        codec: EntryCodec,
        request_timeout: Duration,
    ) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            codec,
            request_timeout,
        })
    }

    /// Create an in-memory store (useful for testing)
    pub fn open_in_memory(codec: EntryCodec, request_timeout: Duration) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            codec,
            request_timeout,
        })
    }

    /// Run one physical operation on the blocking pool under the bounded wait
    async fn run_bounded<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let handle = tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            op(&conn)
        });

        match tokio::time::timeout(self.request_timeout, handle).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(e))) => Err(StoreError::PersistenceFailed(e.to_string())),
            Ok(Err(join)) => Err(StoreError::PersistenceFailed(join.to_string())),
            Err(_) => Err(StoreError::PersistenceFailed(format!(
                "request timed out after {:?}",
                self.request_timeout
            ))),
        }
    }

    async fn resolve_canonical(&self, identifier: &str) -> StoreResult<Option<String>> {
        let identifier = identifier.to_string();
        self.run_bounded(move |conn| {
            conn.query_row(
                "SELECT canonical FROM lookup_aliases WHERE alias = ?1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn read_row(&self, canonical: &str) -> StoreResult<Option<LookupEntry>> {
        let key = canonical.to_string();
        let raw: Option<String> = self
            .run_bounded(move |conn| {
                conn.query_row(
                    "SELECT entry FROM lookup_rows WHERE uri = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let entry = self
            .codec
            .decode(&raw)
            .map_err(|e| StoreError::PersistenceFailed(e.to_string()))?;
        Ok(Some(entry))
    }
}

#[async_trait]
impl LookupEntryStore for ColumnLookupStore {
    async fn store(&self, entry: &LookupEntry) -> StoreResult<()> {
        let encoded = self
            .codec
            .encode(entry)
            .map_err(|e| StoreError::PersistenceFailed(e.to_string()))?;

        // Index mutation first, primary row second. Not atomic.
        let canonical = entry.uri.clone();
        let aliases: Vec<String> = entry.alias_uris.iter().cloned().collect();
        self.run_bounded(move |conn| {
            for alias in &aliases {
                conn.execute(
                    r#"
                    INSERT INTO lookup_aliases (alias, canonical)
                    VALUES (?1, ?2)
                    ON CONFLICT(alias) DO UPDATE SET canonical = excluded.canonical
                    "#,
                    params![alias, canonical],
                )?;
            }
            Ok(())
        })
        .await?;

        let canonical = entry.uri.clone();
        self.run_bounded(move |conn| {
            conn.execute(
                r#"
                INSERT INTO lookup_rows (uri, entry)
                VALUES (?1, ?2)
                ON CONFLICT(uri) DO UPDATE SET entry = excluded.entry
                "#,
                params![canonical, encoded],
            )?;
            Ok(())
        })
        .await
    }

    async fn entry_for(&self, identifier: &str) -> StoreResult<Option<LookupEntry>> {
        // Alias hop through the index, then the canonical row. A row
        // whose index entry went missing is still reachable by its
        // primary URI.
        let canonical = self
            .resolve_canonical(identifier)
            .await?
            .unwrap_or_else(|| identifier.to_string());
        self.read_row(&canonical).await
    }

    async fn entries_for_canonical_uris(&self, uris: &[String]) -> StoreResult<Vec<LookupEntry>> {
        let mut entries = Vec::with_capacity(uris.len());
        for uri in uris {
            if let Some(entry) = self.read_row(uri).await? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn ensure_lookup(&self, entry: &LookupEntry) -> StoreResult<bool> {
        // Existence probe against the index only.
        if self.resolve_canonical(&entry.uri).await?.is_some() {
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

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn store() -> ColumnLookupStore {
        ColumnLookupStore::open_in_memory(EntryCodec::json(), TIMEOUT).unwrap()
    }

    fn entry() -> LookupEntry {
        LookupEntry::for_ref(
            &ContentRef::new(
                "http://itv.com/brands/dancing-on-ice",
                Publisher::Itv,
                ContentCategory::Container,
            ),
            7,
        )
        .with_alias_uris(["http://itv.com/1234"])
    }

    #[tokio::test]
    async fn test_store_and_read_by_canonical_uri() {
        let store = store();
        let entry = entry();
        store.store(&entry).await.unwrap();

        let found = store.entry_for(&entry.uri).await.unwrap().unwrap();
        assert_eq!(found, entry);
    }

    #[tokio::test]
    async fn test_alias_resolves_through_index() {
        let store = store();
        let entry = entry();
        store.store(&entry).await.unwrap();

        let found = store.entry_for("http://itv.com/1234").await.unwrap().unwrap();
        assert_eq!(found.uri, entry.uri);
    }

    #[tokio::test]
    async fn test_missing_identifier_is_absent() {
        let store = store();
        assert!(store.entry_for("http://nowhere/9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_lookup_is_idempotent() {
        let store = store();
        let entry = entry();
        assert!(store.ensure_lookup(&entry).await.unwrap());
        assert!(!store.ensure_lookup(&entry).await.unwrap());
    }

    #[tokio::test]
    async fn test_batched_lookup_reads_primary_rows() {
        let store = store();
        let a = entry();
        store.store(&a).await.unwrap();

        let found = store
            .entries_for_canonical_uris(&[a.uri.clone(), "http://nowhere/9".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_opaque_failure_kind() {
        let store = ColumnLookupStore::open_in_memory(EntryCodec::json(), Duration::from_millis(10))
            .unwrap();

        let result = store
            .run_bounded(|_conn| {
                std::thread::sleep(Duration::from_millis(200));
                Ok(())
            })
            .await;

        match result {
            Err(StoreError::PersistenceFailed(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected opaque persistence failure, got {:?}", other),
        }
    }
}
