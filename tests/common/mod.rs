//! Common helpers for the integration suites

use std::collections::BTreeSet;
use syndex::{ContentCategory, ContentRef, Publisher};

pub fn container_ref(uri: &str, publisher: Publisher) -> ContentRef {
    ContentRef::new(uri, publisher, ContentCategory::Container)
}

pub fn scope(publishers: &[Publisher]) -> BTreeSet<Publisher> {
    publishers.iter().copied().collect()
}

pub fn uri_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}
