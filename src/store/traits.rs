//! Store trait definitions

use crate::model::LookupEntry;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The column backend's single opaque failure kind — timeout,
    /// connection loss, and codec failure all collapse to this.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-specific persistence of `LookupEntry`
///
/// Implementations must be thread-safe (Send + Sync) to support
/// concurrent writers. Not-found is `None`, never an error. No
/// implementation retries internally; the caller owns retry policy.
#[async_trait]
pub trait LookupEntryStore: Send + Sync {
    /// Persist the entry under every alias URI
    ///
    /// N aliases mean N independent physical writes holding identical
    /// content — callers must not assume a single mutation.
    async fn store(&self, entry: &LookupEntry) -> StoreResult<()>;

    /// Single-key lookup by canonical URI or alias
    async fn entry_for(&self, identifier: &str) -> StoreResult<Option<LookupEntry>>;

    /// Batched lookup by canonical URIs
    async fn entries_for_canonical_uris(&self, uris: &[String]) -> StoreResult<Vec<LookupEntry>>;

    /// Idempotent create-if-absent for the ingestion hot path
    ///
    /// Reads first and skips the write when a row already exists, to
    /// avoid write contention on frequently-reprocessed content. The
    /// read-then-write race with a concurrent writer is tolerated: a
    /// duplicate insert converges to the same content. Returns whether
    /// a row was created.
    async fn ensure_lookup(&self, entry: &LookupEntry) -> StoreResult<bool>;
}
