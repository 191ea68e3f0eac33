//! Substring search over admitted nodes.
//!
//! # Responsibility
//! - Match a free-text query against node title, author and tags.
//!
//! # Invariants
//! - Matching is case-insensitive.
//! - Hits keep graph insertion order.
//! - Blank queries return no hits.

use crate::graph::store::GraphStore;
use crate::model::node::Node;

/// Search options for node lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSearch {
    /// User query text.
    pub text: String,
    /// Maximum number of hits; `None` means unbounded.
    pub limit: Option<usize>,
}

impl NodeSearch {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl GraphStore {
    /// Returns nodes whose title, author or tags contain the query text.
    pub fn search(&self, query: &NodeSearch) -> Vec<&Node> {
        let needle = query.text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        self.list_all()
            .iter()
            .filter(|node| node_matches(node, &needle))
            .take(limit)
            .collect()
    }
}

fn node_matches(node: &Node, needle: &str) -> bool {
    let record = &node.record;
    if record.title.to_lowercase().contains(needle) {
        return true;
    }
    if record
        .author
        .as_deref()
        .is_some_and(|author| author.to_lowercase().contains(needle))
    {
        return true;
    }
    record
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(needle))
}
