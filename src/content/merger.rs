//! Pure content-merge functions
//!
//! Merging never mutates its inputs; each function returns a fresh
//! value composed from the primary and its resolved equivalents. This
//! keeps the canonical store's objects free of aliasing with in-flight
//! merge computations.

use super::model::{Container, Content, Item};
use std::collections::BTreeSet;

/// Compose a multi-source view of `primary` from its resolved equivalents
///
/// Containers merge child-wise; items pass through unchanged (items
/// are never merged directly — a documented limitation, not a bug).
/// Probable-alias URIs accumulate on the returned container.
pub fn merge(
    primary: &Content,
    equivalents: &[Content],
    probable_aliases: &BTreeSet<String>,
) -> Content {
    match primary {
        Content::Container(container) => {
            let mut merged = merge_container(container, equivalents);
            merged
                .probable_aliases
                .extend(probable_aliases.iter().cloned());
            Content::Container(merged)
        }
        Content::Item(item) => Content::Item(merge_item(item)),
    }
}

/// Merge equivalent containers into a fresh copy of the primary
///
/// For every child of the primary, a "same" child in an equivalent
/// container replaces the versions the primary holds from that child's
/// publisher with the child's native versions. Unmatched children and
/// versions from other publishers are untouched.
pub fn merge_container(primary: &Container, equivalents: &[Content]) -> Container {
    let mut merged = primary.clone();

    for content in equivalents {
        let Content::Container(other) = content else {
            continue;
        };
        merged.equivalence_links.insert(other.uri.clone());

        for item in merged.items.iter_mut() {
            if let Some(same) = find_same_item(item, other) {
                item.versions.retain(|v| v.provider != same.publisher);
                item.versions.extend(same.versions.iter().cloned());
                item.equivalence_links.insert(same.uri.clone());
            }
        }
    }

    merged
}

/// Items are not merged directly
pub fn merge_item(item: &Item) -> Item {
    item.clone()
}

/// "Same" = both are episodes and their (series, episode) pairs are
/// equal. Title equality is available on the model but deliberately
/// not consulted.
fn find_same_item<'a>(item: &Item, container: &'a Container) -> Option<&'a Item> {
    let numbering = item.numbering?;
    container
        .items
        .iter()
        .find(|candidate| candidate.numbering == Some(numbering))
}
