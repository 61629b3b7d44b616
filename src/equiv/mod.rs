//! Equivalence resolution
//!
//! Two generations coexist: the legacy bounded-path store computes
//! closures at read time under a hop cap, while the transitive writer
//! maintains eagerly-computed closures on the lookup entries
//! themselves. The `EquivalenceResolver` seam lets consumers use
//! either; the eager closure is authoritative.

mod bounded;
mod hooks;
mod resolver;
mod writer;

pub use bounded::{BoundedEquivalenceStore, EquivalenceEdge, DEFAULT_MAX_PATH};
pub use hooks::{NoopAudit, NoopPropagator, UpdatePropagator, WriteAudit};
pub use resolver::{EquivalenceResolver, LookupClosureResolver};
pub use writer::{TransitiveLookupWriter, WriteError, WriteOutcome};
