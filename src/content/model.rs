//! Content model consumed by the equivalence merger
//!
//! A deliberately narrow view of the platform's content: enough shape
//! to compose a multi-source aggregate of one item. The closed
//! `Content` enum is the dispatch point over the known categories.

use crate::model::Publisher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Positional numbering of an episode within its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeNumbering {
    pub series_number: u32,
    pub episode_number: u32,
}

impl EpisodeNumbering {
    pub fn new(series_number: u32, episode_number: u32) -> Self {
        Self {
            series_number,
            episode_number,
        }
    }
}

/// A playable encoding of an item, native to one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub uri: String,
    pub provider: Publisher,
    pub duration_secs: Option<u32>,
}

impl Version {
    pub fn new(uri: impl Into<String>, provider: Publisher) -> Self {
        Self {
            uri: uri.into(),
            provider,
            duration_secs: None,
        }
    }

    pub fn with_duration_secs(mut self, duration_secs: u32) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }
}

/// A single piece of content — an episode, clip, or standalone programme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub uri: String,
    pub publisher: Publisher,
    pub title: Option<String>,
    /// Present iff the item is an episode
    pub numbering: Option<EpisodeNumbering>,
    pub versions: Vec<Version>,
    /// URIs of items this one has been merged with
    pub equivalence_links: BTreeSet<String>,
}

impl Item {
    pub fn new(uri: impl Into<String>, publisher: Publisher) -> Self {
        Self {
            uri: uri.into(),
            publisher,
            title: None,
            numbering: None,
            versions: Vec::new(),
            equivalence_links: BTreeSet::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_numbering(mut self, series_number: u32, episode_number: u32) -> Self {
        self.numbering = Some(EpisodeNumbering::new(series_number, episode_number));
        self
    }

    pub fn with_versions<I>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = Version>,
    {
        self.versions.extend(versions);
        self
    }

    /// True iff the item is an episode
    pub fn is_episode(&self) -> bool {
        self.numbering.is_some()
    }
}

/// A brand or series grouping items under one publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub uri: String,
    pub publisher: Publisher,
    pub title: Option<String>,
    pub items: Vec<Item>,
    /// URIs of containers this one has been merged with
    pub equivalence_links: BTreeSet<String>,
    /// Equivalent URIs that did not resolve to distinct content
    pub probable_aliases: BTreeSet<String>,
}

impl Container {
    pub fn new(uri: impl Into<String>, publisher: Publisher) -> Self {
        Self {
            uri: uri.into(),
            publisher,
            title: None,
            items: Vec::new(),
            equivalence_links: BTreeSet::new(),
            probable_aliases: BTreeSet::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        self.items.extend(items);
        self
    }
}

/// The closed set of mergeable content shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum Content {
    Container(Container),
    Item(Item),
}

impl Content {
    pub fn uri(&self) -> &str {
        match self {
            Self::Container(c) => &c.uri,
            Self::Item(i) => &i.uri,
        }
    }

    pub fn publisher(&self) -> Publisher {
        match self {
            Self::Container(c) => c.publisher,
            Self::Item(i) => i.publisher,
        }
    }
}
