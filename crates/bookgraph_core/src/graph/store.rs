//! In-memory graph store.
//!
//! # Responsibility
//! - Hold every admitted node and assign node ids.
//! - Serve lookup-by-id and insertion-ordered listing.
//! - Hold explicit edges between admitted nodes.
//!
//! # Invariants
//! - Ids are unique; an insert never overwrites an existing node.
//! - Listing order is insertion order and only changes on insert/seed.
//! - `&mut self` on insert is the single mutation point for id assignment.
//! - Every edge endpoint names a stored node; no self-loops, one edge per pair.
//! - Log events carry positions and counts, never node ids (ids are title slugs).

use crate::model::edge::{normalize_note, Edge, EdgeId};
use crate::model::node::{Node, NodeId, NormalizedNode};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\-]").expect("valid slug charset regex"));
static DASH_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid dash regex"));

pub type GraphResult<T> = Result<T, GraphError>;

/// Query/seed error for the graph store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No node has this id.
    NotFound(NodeId),
    /// A seeded node reuses an id already present.
    DuplicateId(NodeId),
    /// No edge has this id.
    EdgeNotFound(EdgeId),
    /// An edge was requested from a node to itself.
    SelfLoop(NodeId),
    /// The two nodes are already joined, in either direction.
    AlreadyConnected { source: NodeId, target: NodeId },
    /// A seeded edge reuses an edge id already present.
    DuplicateEdgeId(EdgeId),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "node not found: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate node id: {id}"),
            Self::EdgeNotFound(id) => write!(f, "edge not found: {id}"),
            Self::SelfLoop(id) => write!(f, "node {id} cannot be connected to itself"),
            Self::AlreadyConnected { source, target } => {
                write!(f, "nodes {source} and {target} are already connected")
            }
            Self::DuplicateEdgeId(id) => write!(f, "duplicate edge id: {id}"),
        }
    }
}

impl Error for GraphError {}

/// Authoritative collection of admitted nodes.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    /// Next collision suffix per slug base.
    suffixes: HashMap<String, u32>,
    edges: Vec<Edge>,
    edge_index: HashMap<EdgeId, usize>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a validated node under a fresh id and returns that id.
    pub fn insert(&mut self, record: NormalizedNode) -> NodeId {
        let id = self.allocate_id(&record.title);
        let position = self.nodes.len();
        self.index.insert(id.clone(), position);
        self.nodes.push(Node::new(id.clone(), record));
        info!(
            "event=node_insert module=graph status=ok position={} graph_size={}",
            position,
            self.nodes.len()
        );
        id
    }

    /// Admits previously persisted nodes, keeping their ids and order.
    ///
    /// # Errors
    /// - Returns `DuplicateId` when an id repeats within `nodes` or is already
    ///   stored; nothing is admitted in that case.
    pub fn seed(&mut self, nodes: Vec<Node>) -> GraphResult<usize> {
        let mut incoming = HashSet::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if self.index.contains_key(&node.id) || !incoming.insert(node.id.clone()) {
                warn!(
                    "event=graph_seed module=graph status=error error_code=duplicate_id position={position}"
                );
                return Err(GraphError::DuplicateId(node.id.clone()));
            }
        }

        let count = nodes.len();
        for node in nodes {
            self.index.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
        }
        info!(
            "event=graph_seed module=graph status=ok seeded={} graph_size={}",
            count,
            self.nodes.len()
        );
        Ok(count)
    }

    /// Looks up one node by id.
    pub fn get(&self, id: &NodeId) -> GraphResult<&Node> {
        match self.index.get(id) {
            Some(position) => Ok(&self.nodes[*position]),
            None => {
                debug!("event=node_get module=graph status=not_found");
                Err(GraphError::NotFound(id.clone()))
            }
        }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn list_all(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Draws an edge between two stored nodes and returns its fresh id.
    ///
    /// # Errors
    /// - `NotFound` when either endpoint is unknown.
    /// - `SelfLoop` when `source == target`.
    /// - `AlreadyConnected` when the pair is joined in either direction.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        note: Option<&str>,
    ) -> GraphResult<EdgeId> {
        self.check_endpoints(source, target)?;
        if self.edges.iter().any(|edge| edge.joins(source, target)) {
            return Err(GraphError::AlreadyConnected {
                source: source.clone(),
                target: target.clone(),
            });
        }

        let mut id = EdgeId::generate();
        while self.edge_index.contains_key(&id) {
            id = EdgeId::generate();
        }
        let position = self.edges.len();
        self.edge_index.insert(id.clone(), position);
        self.edges
            .push(Edge::new(id.clone(), source.clone(), target.clone(), note));
        info!(
            "event=edge_insert module=graph status=ok edge_id={} edge_count={}",
            id,
            self.edges.len()
        );
        Ok(id)
    }

    /// Admits previously persisted edges, keeping their ids and order.
    ///
    /// # Errors
    /// - `DuplicateEdgeId`, `NotFound`, `SelfLoop` or `AlreadyConnected` for
    ///   the first offending edge; nothing is admitted in that case.
    pub fn seed_edges(&mut self, edges: Vec<Edge>) -> GraphResult<usize> {
        let mut incoming: Vec<&Edge> = Vec::with_capacity(edges.len());
        for edge in &edges {
            if self.edge_index.contains_key(&edge.id)
                || incoming.iter().any(|seen| seen.id == edge.id)
            {
                return Err(GraphError::DuplicateEdgeId(edge.id.clone()));
            }
            self.check_endpoints(&edge.source, &edge.target)?;
            let joined = |other: &Edge| other.joins(&edge.source, &edge.target);
            if self.edges.iter().any(joined) || incoming.iter().any(|seen| joined(*seen)) {
                return Err(GraphError::AlreadyConnected {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                });
            }
            incoming.push(edge);
        }

        let count = edges.len();
        for mut edge in edges {
            edge.note = normalize_note(Some(edge.note.as_str()));
            self.edge_index.insert(edge.id.clone(), self.edges.len());
            self.edges.push(edge);
        }
        info!(
            "event=graph_seed_edges module=graph status=ok seeded={} edge_count={}",
            count,
            self.edges.len()
        );
        Ok(count)
    }

    pub fn edge(&self, id: &EdgeId) -> GraphResult<&Edge> {
        self.edge_index
            .get(id)
            .map(|position| &self.edges[*position])
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))
    }

    /// Replaces the note of one edge; `None` or blank clears it.
    pub fn set_edge_note(&mut self, id: &EdgeId, note: Option<&str>) -> GraphResult<&Edge> {
        let position = *self
            .edge_index
            .get(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        self.edges[position].note = normalize_note(note);
        debug!("event=edge_update module=graph status=ok edge_id={id}");
        Ok(&self.edges[position])
    }

    /// Deletes one edge; the remaining edges keep their relative order.
    pub fn remove_edge(&mut self, id: &EdgeId) -> GraphResult<Edge> {
        let position = self
            .edge_index
            .remove(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        let removed = self.edges.remove(position);
        for (offset, edge) in self.edges[position..].iter().enumerate() {
            self.edge_index.insert(edge.id.clone(), position + offset);
        }
        info!(
            "event=edge_remove module=graph status=ok edge_id={} edge_count={}",
            id,
            self.edges.len()
        );
        Ok(removed)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges touching `node` at either end, in insertion order.
    pub fn edges_of(&self, node: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|edge| edge.touches(node)).collect()
    }

    fn check_endpoints(&self, source: &NodeId, target: &NodeId) -> GraphResult<()> {
        for endpoint in [source, target] {
            if !self.index.contains_key(endpoint) {
                return Err(GraphError::NotFound(endpoint.clone()));
            }
        }
        if source == target {
            return Err(GraphError::SelfLoop(source.clone()));
        }
        Ok(())
    }

    fn allocate_id(&mut self, title: &str) -> NodeId {
        let base = slugify(title);
        if base.is_empty() {
            return self.fallback_id();
        }

        let candidate = NodeId::new(base.clone());
        if !self.index.contains_key(&candidate) {
            return candidate;
        }

        let suffix = self.suffixes.entry(base.clone()).or_insert(2);
        loop {
            let candidate = NodeId::new(format!("{base}-{suffix}"));
            *suffix += 1;
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn fallback_id(&self) -> NodeId {
        loop {
            let candidate = NodeId::new(format!("node-{}", Uuid::new_v4().simple()));
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// Converts a title into a lowercase, dash-separated id slug.
///
/// Returns an empty string when nothing slug-safe remains.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(&lowered, "-");
    let filtered = NON_SLUG_RE.replace_all(&dashed, "");
    let collapsed = DASH_RUN_RE.replace_all(&filtered, "-");
    collapsed.trim_matches('-').to_string()
}
