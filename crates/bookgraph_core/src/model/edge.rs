//! Explicit connection between two nodes.
//!
//! # Invariants
//! - `source` and `target` name admitted nodes and differ from each other.
//! - At most one edge joins a node pair, in either direction.
//! - `note` is trimmed; an absent note is the empty string.

use crate::model::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh random id for a newly drawn edge.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Directed connection drawn by the user, with an optional note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub note: String,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, note: Option<&str>) -> Self {
        Self {
            id,
            source,
            target,
            note: normalize_note(note),
        }
    }

    /// Whether this edge touches `node` at either end.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// Whether this edge joins `a` and `b`, ignoring direction.
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}

/// Trims a note; `None` and blank input both become `""`.
pub fn normalize_note(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}
