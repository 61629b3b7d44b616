//! Lookup entry persistence
//!
//! Backends honor one contract through the `LookupEntryStore` trait.
//! The document layout keys a full record under every alias URI; the
//! column layout keeps one canonical row plus an inverted alias index
//! and bounds each physical operation with a request timeout.

mod column;
mod document;
mod memory;
mod summary;
mod traits;

pub use column::{ColumnLookupStore, EntryCodec};
pub use document::DocumentLookupStore;
pub use memory::MemoryLookupStore;
pub use summary::EquivalenceSummaryStore;
pub use traits::{LookupEntryStore, StoreError, StoreResult};
