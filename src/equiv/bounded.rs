//! Legacy bounded-path equivalence store
//!
//! Pairwise undirected edges with no precomputed closure; the closure
//! is assembled at read time by a breadth-first expansion capped at
//! `max_path` iterations. Chains longer than the cap yield a truncated
//! closure — a documented completeness trade-off, not a failure. The
//! eager-closure writer supersedes this store; it remains as a
//! deliberately scoped fallback for readers not yet migrated.

use crate::store::StoreResult;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

/// Default read-time expansion cap
pub const DEFAULT_MAX_PATH: usize = 5;

/// An undirected, append-only equivalence edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceEdge {
    pub left: String,
    pub right: String,
}

impl EquivalenceEdge {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Pairwise-edge store with bounded-depth read-time traversal
pub struct BoundedEquivalenceStore {
    conn: Mutex<Connection>,
    max_path: usize,
}

impl BoundedEquivalenceStore {
    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS equiv_edges (
                left_uri TEXT NOT NULL,
                right_uri TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_equiv_left ON equiv_edges(left_uri);
            CREATE INDEX IF NOT EXISTS idx_equiv_right ON equiv_edges(right_uri);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Open or create a store at the given path with the given expansion cap
    pub fn open(path: impl AsRef<Path>, max_path: usize) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            max_path,
        })
    }

    /// Create an in-memory store (useful for testing)
    pub fn open_in_memory(max_path: usize) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            max_path,
        })
    }

    pub fn max_path(&self) -> usize {
        self.max_path
    }

    /// Append an edge; edges are never updated or deleted
    pub fn store(&self, edge: &EquivalenceEdge) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO equiv_edges (left_uri, right_uri) VALUES (?1, ?2)",
            params![edge.left, edge.right],
        )?;
        Ok(())
    }

    /// Closure of the given URIs, excluding the input set itself
    ///
    /// Breadth-first expansion for up to `max_path` iterations. The
    /// frontier advances only through newly-seen URIs, so cyclic edge
    /// sets terminate; stops early once the frontier empties.
    pub fn equivalents_of(&self, uris: &BTreeSet<String>) -> StoreResult<BTreeSet<String>> {
        let conn = self.conn.lock().unwrap();

        let mut seen: BTreeSet<String> = uris.clone();
        let mut frontier: Vec<String> = uris.iter().cloned().collect();

        for _ in 0..self.max_path {
            if frontier.is_empty() {
                break;
            }

            let mut discovered: Vec<String> = Vec::new();
            let mut stmt = conn.prepare(
                "SELECT left_uri, right_uri FROM equiv_edges
                 WHERE left_uri = ?1 OR right_uri = ?1",
            )?;

            for uri in &frontier {
                let rows = stmt.query_map(params![uri], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                for row in rows {
                    let (left, right) = row?;
                    let neighbour = if &left == uri { right } else { left };
                    if seen.insert(neighbour.clone()) {
                        discovered.push(neighbour);
                    }
                }
            }

            frontier = discovered;
        }

        Ok(seen.difference(uris).cloned().collect())
    }
}
