//! Identity references: one source's view of one content item

use serde::{Deserialize, Serialize};

/// A publishing source contributing metadata to the platform
///
/// Closed set — equivalence scoping and version replacement both key on
/// the publisher, so an unknown source must fail deserialization rather
/// than silently pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Publisher {
    #[serde(rename = "bbc.co.uk")]
    Bbc,
    #[serde(rename = "itv.com")]
    Itv,
    #[serde(rename = "channel4.com")]
    C4,
    #[serde(rename = "five.tv")]
    Five,
    #[serde(rename = "pressassociation.com")]
    Pa,
    #[serde(rename = "youtube.com")]
    Youtube,
    #[serde(rename = "radiotimes.com")]
    RadioTimes,
}

impl Publisher {
    /// The stable wire key for this publisher
    pub fn key(&self) -> &'static str {
        match self {
            Self::Bbc => "bbc.co.uk",
            Self::Itv => "itv.com",
            Self::C4 => "channel4.com",
            Self::Five => "five.tv",
            Self::Pa => "pressassociation.com",
            Self::Youtube => "youtube.com",
            Self::RadioTimes => "radiotimes.com",
        }
    }

    /// Look up a publisher by its wire key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "bbc.co.uk" => Some(Self::Bbc),
            "itv.com" => Some(Self::Itv),
            "channel4.com" => Some(Self::C4),
            "five.tv" => Some(Self::Five),
            "pressassociation.com" => Some(Self::Pa),
            "youtube.com" => Some(Self::Youtube),
            "radiotimes.com" => Some(Self::RadioTimes),
            _ => None,
        }
    }
}

impl std::fmt::Display for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Category of the content an identity refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Container,
    Item,
    Person,
    Organisation,
    Event,
    Topic,
    Channel,
    Segment,
    Product,
}

impl ContentCategory {
    /// The stable wire key for this category
    pub fn key(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Item => "item",
            Self::Person => "person",
            Self::Organisation => "organisation",
            Self::Event => "event",
            Self::Topic => "topic",
            Self::Channel => "channel",
            Self::Segment => "segment",
            Self::Product => "product",
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A namespaced external identifier, distinct from URIs
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Alias {
    pub namespace: String,
    pub value: String,
}

impl Alias {
    pub fn new(namespace: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            value: value.into(),
        }
    }
}

/// Identifies one source's representation of one content item
///
/// Two refs are equal iff all four fields match. Lives in ordered sets
/// throughout the entry model so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LookupRef {
    pub uri: String,
    pub id: i64,
    pub publisher: Publisher,
    pub category: ContentCategory,
}

impl LookupRef {
    pub fn new(
        uri: impl Into<String>,
        id: i64,
        publisher: Publisher,
        category: ContentCategory,
    ) -> Self {
        Self {
            uri: uri.into(),
            id,
            publisher,
            category,
        }
    }
}

impl std::fmt::Display for LookupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.uri, self.publisher)
    }
}

/// A source's description of an item before an id has been assigned
///
/// The input shape for `write_lookup` — carries enough to create a
/// `LookupEntry` when none exists yet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub uri: String,
    pub publisher: Publisher,
    pub category: ContentCategory,
}

impl ContentRef {
    pub fn new(uri: impl Into<String>, publisher: Publisher, category: ContentCategory) -> Self {
        Self {
            uri: uri.into(),
            publisher,
            category,
        }
    }
}
