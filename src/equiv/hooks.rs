//! Audit and propagation hooks
//!
//! External collaborators the writer signals after each successful
//! graph mutation. Hooks are fire-and-forget; they must not fail the
//! write.

use crate::messages::EntityUpdatedMessage;
use crate::model::LookupEntry;

/// Write-logging hook, signalled once per persisted entry
pub trait WriteAudit: Send + Sync {
    fn record_write(&self, entry: &LookupEntry);
}

/// Downstream propagation hook, signalled once per persisted entry
pub trait UpdatePropagator: Send + Sync {
    fn entity_updated(&self, message: EntityUpdatedMessage);
}

/// Default audit hook that records nothing
#[derive(Debug, Default)]
pub struct NoopAudit;

impl WriteAudit for NoopAudit {
    fn record_write(&self, _entry: &LookupEntry) {}
}

/// Default propagation hook that emits nothing
#[derive(Debug, Default)]
pub struct NoopPropagator;

impl UpdatePropagator for NoopPropagator {
    fn entity_updated(&self, _message: EntityUpdatedMessage) {}
}
