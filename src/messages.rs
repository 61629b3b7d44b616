//! Message shapes carried by the platform bus
//!
//! Only the shapes are in scope here; delivery guarantees belong to
//! the transport.

use crate::model::LookupEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// An equivalence assertion consumed from the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquivalenceAssertionMessage {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub subject_id: i64,
    pub outgoing_ids_added: BTreeSet<i64>,
    pub outgoing_ids_removed: BTreeSet<i64>,
    pub outgoing_ids_unchanged: BTreeSet<i64>,
    pub sources: BTreeSet<String>,
}

/// Downstream propagation message produced after a successful graph write
///
/// Dependent materialized views consume these to converge
/// asynchronously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpdatedMessage {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub entity_id: i64,
    pub entity_type: String,
    pub entity_source: String,
}

impl EntityUpdatedMessage {
    /// Build the propagation message for a just-written entry
    pub fn for_entry(entry: &LookupEntry) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            entity_id: entry.id,
            entity_type: entry.self_ref.category.key().to_string(),
            entity_source: entry.self_ref.publisher.key().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentCategory, ContentRef, Publisher};

    #[test]
    fn test_entity_updated_carries_entry_identity() {
        let entry = LookupEntry::for_ref(
            &ContentRef::new("http://bbc.co.uk/p/1", Publisher::Bbc, ContentCategory::Item),
            42,
        );
        let message = EntityUpdatedMessage::for_entry(&entry);
        assert_eq!(message.entity_id, 42);
        assert_eq!(message.entity_type, "item");
        assert_eq!(message.entity_source, "bbc.co.uk");
    }

    #[test]
    fn test_assertion_message_wire_names() {
        let message = EquivalenceAssertionMessage {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            subject_id: 1,
            outgoing_ids_added: BTreeSet::from([2]),
            outgoing_ids_removed: BTreeSet::new(),
            outgoing_ids_unchanged: BTreeSet::new(),
            sources: BTreeSet::from(["bbc.co.uk".to_string()]),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("messageId").is_some());
        assert!(json.get("outgoingIdsAdded").is_some());
        assert!(json.get("subjectId").is_some());
    }
}
