//! Dimension keys: canonical, order-independent tag sets.
//!
//! A dimension key is the unit of routing. Two tag collections holding the
//! same tags, in any order and with any duplication, produce equal keys.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Separator used when a key's tags are rendered as a message prefix.
const TAG_SEPARATOR: &str = " ";

/// Canonical identity of a set of tags.
///
/// Tags are stored sorted and deduplicated, so derived equality and hashing
/// are plain set equality over the tag strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DimensionKey {
    tags: Vec<String>,
}

impl DimensionKey {
    /// Normalize any collection of tags into a key.
    ///
    /// An empty collection yields a degenerate key with no tags. It is
    /// accepted like any other key but nothing meaningful binds to it.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        Self {
            tags: unique.into_iter().collect(),
        }
    }

    /// Key for a single tag.
    pub fn single(tag: impl Into<String>) -> Self {
        Self {
            tags: vec![tag.into()],
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.binary_search_by(|probe| probe.as_str().cmp(tag)).is_ok()
    }

    /// Tags joined by a single space, in canonical order.
    pub fn prefix(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

impl From<&str> for DimensionKey {
    fn from(tag: &str) -> Self {
        Self::single(tag)
    }
}

impl From<String> for DimensionKey {
    fn from(tag: String) -> Self {
        Self::single(tag)
    }
}

impl From<&String> for DimensionKey {
    fn from(tag: &String) -> Self {
        Self::single(tag.as_str())
    }
}

impl<const N: usize> From<[&str; N]> for DimensionKey {
    fn from(tags: [&str; N]) -> Self {
        Self::new(tags)
    }
}

impl<const N: usize> From<[String; N]> for DimensionKey {
    fn from(tags: [String; N]) -> Self {
        Self::new(tags)
    }
}

impl From<&[&str]> for DimensionKey {
    fn from(tags: &[&str]) -> Self {
        Self::new(tags.iter().copied())
    }
}

impl From<Vec<&str>> for DimensionKey {
    fn from(tags: Vec<&str>) -> Self {
        Self::new(tags)
    }
}

impl From<Vec<String>> for DimensionKey {
    fn from(tags: Vec<String>) -> Self {
        Self::new(tags)
    }
}

impl From<BTreeSet<String>> for DimensionKey {
    fn from(tags: BTreeSet<String>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
        }
    }
}

impl From<HashSet<String>> for DimensionKey {
    fn from(tags: HashSet<String>) -> Self {
        Self::new(tags)
    }
}

impl From<HashSet<&str>> for DimensionKey {
    fn from(tags: HashSet<&str>) -> Self {
        Self::new(tags)
    }
}
