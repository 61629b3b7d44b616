//! End-to-end lookup write flow over the persistent backends
//!
//! Exercises the transitive writer against both storage layouts:
//! assertions arrive one at a time, the graph converges, and every
//! member of a settled component reports the identical closure after
//! a reopen from disk.

mod common;

use common::{container_ref, scope, uri_set};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use syndex::{
    ColumnLookupStore, DocumentLookupStore, EntryCodec, IdGenerator, LookupEntry,
    LookupEntryStore, Publisher, SequenceIdGenerator, TransitiveLookupWriter, WriteAudit,
};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn closure_uris(store: &dyn LookupEntryStore, uri: &str) -> BTreeSet<String> {
    store
        .entry_for(uri)
        .await
        .unwrap()
        .unwrap()
        .equivalents
        .iter()
        .map(|r| r.uri.clone())
        .collect()
}

async fn assert_component_converged(store: &dyn LookupEntryStore, members: &[&str]) {
    let expected = uri_set(members);
    for member in members {
        assert_eq!(
            closure_uris(store, member).await,
            expected,
            "closure mismatch for {member}"
        );
    }
}

async fn run_assertion_chain(store: Arc<dyn LookupEntryStore>) {
    let writer = TransitiveLookupWriter::new(store, Arc::new(SequenceIdGenerator::new()));

    writer
        .write_lookup(
            &container_ref("http://bbc.co.uk/b/1", Publisher::Bbc),
            &[container_ref("http://itv.com/b/9", Publisher::Itv)],
            &scope(&[Publisher::Bbc]),
        )
        .await
        .unwrap();

    writer
        .write_lookup(
            &container_ref("http://five.tv/b/4", Publisher::Five),
            &[container_ref("http://itv.com/b/9", Publisher::Itv)],
            &scope(&[Publisher::Five]),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_document_backend_converges_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lookup.db");

    let store = Arc::new(DocumentLookupStore::open(&path).unwrap());
    run_assertion_chain(Arc::clone(&store) as Arc<dyn LookupEntryStore>).await;

    drop(store);
    let reopened = DocumentLookupStore::open(&path).unwrap();
    assert_component_converged(
        &reopened,
        &["http://bbc.co.uk/b/1", "http://itv.com/b/9", "http://five.tv/b/4"],
    )
    .await;
}

#[tokio::test]
async fn test_column_backend_converges_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lookup.db");

    let store = Arc::new(ColumnLookupStore::open(&path, EntryCodec::json(), TIMEOUT).unwrap());
    run_assertion_chain(Arc::clone(&store) as Arc<dyn LookupEntryStore>).await;

    drop(store);
    let reopened = ColumnLookupStore::open(&path, EntryCodec::json(), TIMEOUT).unwrap();
    assert_component_converged(
        &reopened,
        &["http://bbc.co.uk/b/1", "http://itv.com/b/9", "http://five.tv/b/4"],
    )
    .await;
}

#[tokio::test]
async fn test_reassertion_heals_dangling_direct_edge() {
    // A ref whose entry never made it to the store — the shape a crash
    // mid-batch leaves behind. Re-asserting must converge, not fail.
    let store: Arc<dyn LookupEntryStore> = Arc::new(DocumentLookupStore::open_in_memory().unwrap());
    let ids = Arc::new(SequenceIdGenerator::new());

    let mut orphaned = LookupEntry::for_ref(
        &container_ref("http://bbc.co.uk/b/1", Publisher::Bbc),
        ids.next_id(),
    );
    orphaned.direct_equivalents.insert(syndex::LookupRef::new(
        "http://ghost/never-written",
        999,
        Publisher::Pa,
        syndex::ContentCategory::Container,
    ));
    store.store(&orphaned).await.unwrap();

    let writer = TransitiveLookupWriter::new(Arc::clone(&store), ids);
    writer
        .write_lookup(
            &container_ref("http://bbc.co.uk/b/1", Publisher::Bbc),
            &[container_ref("http://itv.com/b/9", Publisher::Itv)],
            &scope(&[Publisher::Itv]),
        )
        .await
        .unwrap();

    // The unresolvable ref contributes nothing to the closure
    assert_eq!(
        closure_uris(store.as_ref(), "http://bbc.co.uk/b/1").await,
        uri_set(&["http://bbc.co.uk/b/1", "http://itv.com/b/9"]),
    );
}

struct RecordingAudit {
    uris: Mutex<Vec<String>>,
}

impl WriteAudit for RecordingAudit {
    fn record_write(&self, entry: &LookupEntry) {
        self.uris.lock().unwrap().push(entry.uri.clone());
    }
}

#[tokio::test]
async fn test_audit_hook_fires_once_per_persisted_entry() {
    let store: Arc<dyn LookupEntryStore> = Arc::new(DocumentLookupStore::open_in_memory().unwrap());
    let audit = Arc::new(RecordingAudit {
        uris: Mutex::new(Vec::new()),
    });
    let writer = TransitiveLookupWriter::new(store, Arc::new(SequenceIdGenerator::new()))
        .with_audit(Arc::clone(&audit) as Arc<dyn WriteAudit>);

    let subject = container_ref("http://bbc.co.uk/b/1", Publisher::Bbc);
    let partners = [container_ref("http://itv.com/b/9", Publisher::Itv)];
    let publishers = scope(&[Publisher::Bbc]);

    writer.write_lookup(&subject, &partners, &publishers).await.unwrap();
    assert_eq!(audit.uris.lock().unwrap().len(), 2);

    // Identical reassertion writes nothing and stays silent
    writer.write_lookup(&subject, &partners, &publishers).await.unwrap();
    assert_eq!(audit.uris.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_alias_fan_out_on_disk() {
    let store = DocumentLookupStore::open_in_memory().unwrap();
    let entry = LookupEntry::for_ref(
        &container_ref("http://bbc.co.uk/b/1", Publisher::Bbc),
        1,
    )
    .with_alias_uris(["http://bbc.co.uk/1", "http://www.bbc.co.uk/b/1"]);

    store.store(&entry).await.unwrap();

    for alias in ["http://bbc.co.uk/b/1", "http://bbc.co.uk/1", "http://www.bbc.co.uk/b/1"] {
        let found = store.entry_for(alias).await.unwrap().unwrap();
        assert_eq!(found, entry, "alias {alias} must resolve to the identical record");
    }
}
