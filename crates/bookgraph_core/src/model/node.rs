//! Node domain model.
//!
//! # Responsibility
//! - Define the admitted graph record and its validated, id-less payload.
//! - Provide the stable identifier type used by store and selection.
//!
//! # Invariants
//! - `NodeId` is assigned once by the graph store and never changes.
//! - A `Node` is never mutated after admission.
//! - `tags` is non-empty and holds trimmed, non-empty tokens.
//! - `links` and `details` never contain blank entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Stable identifier of an admitted node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps an existing identifier value (seeded or externally referenced).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One key/value detail pair, both sides non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub key: String,
    pub value: String,
}

impl Detail {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Validated node payload produced from a draft, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedNode {
    /// Trimmed, non-empty title.
    pub title: String,
    pub author: Option<String>,
    /// `None` means unknown, never zero.
    pub year: Option<i32>,
    /// Deduplicated case-sensitively; iteration order is sorted.
    pub tags: BTreeSet<String>,
    pub links: Vec<String>,
    pub details: Vec<Detail>,
    /// Serialized as `abstract` to match external schema naming.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub notes: Option<String>,
    /// `#RRGGBB` display color.
    pub color: Option<String>,
}

/// Admitted graph record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub record: NormalizedNode,
}

impl Node {
    pub fn new(id: NodeId, record: NormalizedNode) -> Self {
        Self { id, record }
    }

    pub fn title(&self) -> &str {
        self.record.title.as_str()
    }

    /// Returns whether the node carries the exact tag token.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.record.tags.contains(tag)
    }
}
