//! Syndex: Lookup & Equivalence Resolution Engine
//!
//! The persistence backbone of a multi-publisher media-metadata
//! platform. Independent sources describe overlapping content under
//! different identifiers; syndex maintains the single queryable notion
//! of "these are the same thing."
//!
//! # Core Concepts
//!
//! - **LookupEntry**: canonical identity record, stored under every
//!   alias URI, carrying its component's full equivalence closure
//! - **TransitiveLookupWriter**: folds equivalence assertions into the
//!   graph, preserving transitive closure and cycle-safety
//! - **BoundedEquivalenceStore**: the legacy pairwise-edge store with
//!   bounded-depth read-time traversal it superseded
//! - **EquivalentContentFinder**: composes a multi-source view of one
//!   item from the resolved graph
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use syndex::{
//!     ContentCategory, ContentRef, MemoryLookupStore, Publisher, SequenceIdGenerator,
//!     TransitiveLookupWriter,
//! };
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryLookupStore::new());
//! let writer = TransitiveLookupWriter::new(store, Arc::new(SequenceIdGenerator::new()));
//!
//! writer
//!     .write_lookup(
//!         &ContentRef::new("http://bbc.co.uk/b/1", Publisher::Bbc, ContentCategory::Container),
//!         &[ContentRef::new("http://itv.com/b/9", Publisher::Itv, ContentCategory::Container)],
//!         &BTreeSet::from([Publisher::Bbc]),
//!     )
//!     .await
//!     .unwrap();
//! # });
//! ```

pub mod content;
pub mod equiv;
mod ids;
pub mod messages;
mod model;
pub mod store;

pub use content::{
    Container, Content, ContentResolver, EpisodeNumbering, EquivalentContent,
    EquivalentContentFinder, Item, ResolveError, Version,
};
pub use equiv::{
    BoundedEquivalenceStore, EquivalenceEdge, EquivalenceResolver, LookupClosureResolver,
    NoopAudit, NoopPropagator, TransitiveLookupWriter, UpdatePropagator, WriteAudit, WriteError,
    WriteOutcome, DEFAULT_MAX_PATH,
};
pub use ids::{IdGenerator, SequenceIdGenerator};
pub use messages::{EntityUpdatedMessage, EquivalenceAssertionMessage};
pub use model::{
    Alias, ContentCategory, ContentRef, EquivalenceSummary, LookupEntry, LookupRef, Publisher,
};
pub use store::{
    ColumnLookupStore, DocumentLookupStore, EntryCodec, EquivalenceSummaryStore, LookupEntryStore,
    MemoryLookupStore, StoreError, StoreResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
