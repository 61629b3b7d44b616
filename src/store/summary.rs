//! Equivalence summary store
//!
//! Staging records keyed by subject URI, with a secondary index on
//! `parent` for children-of-parent queries. `store` overwrites — a new
//! ingestion cycle replaces the previous summary wholesale.

use super::traits::StoreResult;
use crate::model::EquivalenceSummary;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Store for the disposable mid-pipeline staging records
pub struct EquivalenceSummaryStore {
    conn: Mutex<Connection>,
}

impl EquivalenceSummaryStore {
    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS equivalence_summaries (
                subject TEXT PRIMARY KEY,
                parent TEXT,
                doc TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_summaries_parent
                ON equivalence_summaries(parent);

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

    /// Insert or overwrite the summary for its subject
    pub fn store(&self, summary: &EquivalenceSummary) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let doc = serde_json::to_string(summary)?;
        conn.execute(
            r#"
            INSERT INTO equivalence_summaries (subject, parent, doc)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(subject) DO UPDATE SET
                parent = excluded.parent,
                doc = excluded.doc
            "#,
            params![summary.subject, summary.parent, doc],
        )?;
        Ok(())
    }

    /// Load the summary for a subject URI
    pub fn summary_for(&self, subject: &str) -> StoreResult<Option<EquivalenceSummary>> {
        let conn = self.conn.lock().unwrap();
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM equivalence_summaries WHERE subject = ?1",
                params![subject],
                |row| row.get(0),
            )
            .optional()?;

        let Some(doc) = doc else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&doc)?))
    }

    /// Load every child summary of a parent URI, via the secondary index
    pub fn children_of(&self, parent: &str) -> StoreResult<Vec<EquivalenceSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT doc FROM equivalence_summaries WHERE parent = ?1 ORDER BY subject",
        )?;
        let docs = stmt.query_map(params![parent], |row| row.get::<_, String>(0))?;

        let mut summaries = Vec::new();
        for doc in docs {
            summaries.push(serde_json::from_str(&doc?)?);
        }
        Ok(summaries)
    }

    /// Discard the summary for a subject; absent rows are a no-op
    pub fn remove(&self, subject: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM equivalence_summaries WHERE subject = ?1",
            params![subject],
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentCategory, ContentRef, Publisher};

    fn child_summary(subject: &str, parent: &str) -> EquivalenceSummary {
        EquivalenceSummary::new(subject, Some(parent.to_string()))
            .with_candidates(["http://itv.com/episodes/44"])
            .with_equivalent(
                Publisher::Itv,
                ContentRef::new("http://itv.com/episodes/44", Publisher::Itv, ContentCategory::Item),
            )
    }

    #[test]
    fn test_store_overwrites_per_subject() {
        let store = EquivalenceSummaryStore::open_in_memory().unwrap();
        let first = child_summary("http://bbc.co.uk/p/1", "http://bbc.co.uk/b/1");
        store.store(&first).unwrap();

        let second = EquivalenceSummary::new("http://bbc.co.uk/p/1", None)
            .with_candidates(["http://five.tv/9"]);
        store.store(&second).unwrap();

        let found = store.summary_for("http://bbc.co.uk/p/1").unwrap().unwrap();
        assert_eq!(found, second);
    }

    #[test]
    fn test_children_of_uses_parent_index() {
        let store = EquivalenceSummaryStore::open_in_memory().unwrap();
        store
            .store(&child_summary("http://bbc.co.uk/p/1", "http://bbc.co.uk/b/1"))
            .unwrap();
        store
            .store(&child_summary("http://bbc.co.uk/p/2", "http://bbc.co.uk/b/1"))
            .unwrap();
        store
            .store(&child_summary("http://bbc.co.uk/p/3", "http://bbc.co.uk/b/2"))
            .unwrap();

        let children = store.children_of("http://bbc.co.uk/b/1").unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|s| s.parent.as_deref() == Some("http://bbc.co.uk/b/1")));
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let store = EquivalenceSummaryStore::open_in_memory().unwrap();
        assert!(!store.remove("http://nowhere/1").unwrap());
    }
}
