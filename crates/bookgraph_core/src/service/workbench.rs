//! Workbench command/query surface for the presentation layer.
//!
//! # Responsibility
//! - Own the graph store, the open authoring session and the selection.
//! - Map UI commands (add node, node clicked, connect nodes) onto core operations.
//! - Seed from and mirror inserts and edge changes to a `NodeRepository`.
//!
//! # Invariants
//! - At most one authoring session is open at a time.
//! - A persistence failure never rolls back an in-memory change.
//! - A committed node is selectable as soon as `commit_authoring` returns.

use crate::graph::search::NodeSearch;
use crate::graph::store::{GraphError, GraphStore};
use crate::model::draft::{Draft, DraftField, SlotToken};
use crate::model::edge::{Edge, EdgeId};
use crate::model::node::{Node, NodeId};
use crate::repo::node_repo::{DetachedRepository, NodeRepository, RepoError, RepoResult};
use crate::service::authoring::{AuthoringError, AuthoringSession};
use crate::service::selection::SelectionController;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Workbench-level error.
#[derive(Debug)]
pub enum WorkbenchError {
    /// An authoring command arrived while no session is open.
    NoActiveSession,
    Authoring(AuthoringError),
    Graph(GraphError),
    Repo(RepoError),
}

impl Display for WorkbenchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveSession => write!(f, "no authoring session is open"),
            Self::Authoring(err) => write!(f, "{err}"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkbenchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoActiveSession => None,
            Self::Authoring(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AuthoringError> for WorkbenchError {
    fn from(value: AuthoringError) -> Self {
        Self::Authoring(value)
    }
}

impl From<GraphError> for WorkbenchError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<RepoError> for WorkbenchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Id assigned by the graph store.
    pub node_id: NodeId,
    /// Whether the repository accepted the insert hook.
    pub persisted: bool,
}

/// Result of a successful edge command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeOutcome {
    pub edge_id: EdgeId,
    /// Whether the repository accepted the matching edge hook.
    pub persisted: bool,
}

/// Command/query facade over one graph, session and selection.
pub struct Workbench<R: NodeRepository> {
    store: GraphStore,
    authoring: Option<AuthoringSession>,
    selection: SelectionController,
    repo: R,
}

impl Workbench<DetachedRepository> {
    /// Creates an empty workbench without persistence.
    pub fn detached() -> Self {
        Self {
            store: GraphStore::new(),
            authoring: None,
            selection: SelectionController::new(),
            repo: DetachedRepository,
        }
    }
}

impl<R: NodeRepository> Workbench<R> {
    /// Creates a workbench seeded from `repo.load_all()`.
    ///
    /// # Errors
    /// - `Repo` when loading fails.
    /// - `Graph(DuplicateId)` when stored nodes repeat an id.
    /// - `Graph` when a stored edge names an unknown node or repeats a pair.
    pub fn open(repo: R) -> Result<Self, WorkbenchError> {
        let mut store = GraphStore::new();
        store.seed(repo.load_all()?)?;
        store.seed_edges(repo.load_edges()?)?;
        info!(
            "event=workbench_open module=workbench status=ok node_count={} edge_count={}",
            store.len(),
            store.edges().len()
        );
        Ok(Self {
            store,
            authoring: None,
            selection: SelectionController::new(),
            repo,
        })
    }

    /// Starts a fresh authoring session, replacing any open one.
    pub fn open_authoring(&mut self) {
        if self.authoring.as_ref().is_some_and(AuthoringSession::is_open) {
            warn!("event=authoring_open module=workbench status=replaced_open_session");
        }
        self.authoring = Some(AuthoringSession::open());
    }

    /// Draft of the open session, if any.
    pub fn draft(&self) -> Option<&Draft> {
        self.authoring.as_ref().and_then(AuthoringSession::draft)
    }

    pub fn set_field(
        &mut self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), WorkbenchError> {
        Ok(self.session_mut()?.set_field(field, value)?)
    }

    pub fn add_link_slot(&mut self) -> Result<SlotToken, WorkbenchError> {
        Ok(self.session_mut()?.add_link_slot()?)
    }

    pub fn set_link(
        &mut self,
        token: SlotToken,
        url: impl Into<String>,
    ) -> Result<(), WorkbenchError> {
        Ok(self.session_mut()?.set_link(token, url)?)
    }

    pub fn remove_link_slot(&mut self, token: SlotToken) -> Result<(), WorkbenchError> {
        Ok(self.session_mut()?.remove_link_slot(token)?)
    }

    pub fn add_detail_slot(&mut self) -> Result<SlotToken, WorkbenchError> {
        Ok(self.session_mut()?.add_detail_slot()?)
    }

    pub fn set_detail(
        &mut self,
        token: SlotToken,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), WorkbenchError> {
        Ok(self.session_mut()?.set_detail(token, key, value)?)
    }

    pub fn remove_detail_slot(&mut self, token: SlotToken) -> Result<(), WorkbenchError> {
        Ok(self.session_mut()?.remove_detail_slot(token)?)
    }

    /// Commits the open draft and mirrors the new node to the repository.
    ///
    /// On validation failure the session stays open and unchanged.
    pub fn commit_authoring(&mut self) -> Result<CommitOutcome, WorkbenchError> {
        let session = self
            .authoring
            .as_mut()
            .filter(|session| session.is_open())
            .ok_or(WorkbenchError::NoActiveSession)?;
        let node_id = session.commit(&mut self.store)?;
        self.authoring = None;

        let node = self.store.get(&node_id)?;
        let persisted = persist_result("node_persist", self.repo.on_insert(node));

        Ok(CommitOutcome { node_id, persisted })
    }

    /// Draws an edge between two nodes and mirrors it to the repository.
    ///
    /// # Errors
    /// - `Graph(NotFound)` for an unknown endpoint.
    /// - `Graph(SelfLoop)` or `Graph(AlreadyConnected)`; the store is unchanged.
    pub fn connect_nodes(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        note: Option<&str>,
    ) -> Result<EdgeOutcome, WorkbenchError> {
        let edge_id = self.store.connect(source, target, note)?;
        let edge = self.store.edge(&edge_id)?;
        let persisted = persist_result("edge_persist", self.repo.on_edge_insert(edge));
        Ok(EdgeOutcome { edge_id, persisted })
    }

    /// Replaces an edge note; `None` or blank clears it.
    pub fn set_edge_note(
        &mut self,
        id: &EdgeId,
        note: Option<&str>,
    ) -> Result<EdgeOutcome, WorkbenchError> {
        let edge = self.store.set_edge_note(id, note)?;
        let persisted = persist_result("edge_persist", self.repo.on_edge_update(edge));
        Ok(EdgeOutcome {
            edge_id: id.clone(),
            persisted,
        })
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<EdgeOutcome, WorkbenchError> {
        let removed = self.store.remove_edge(id)?;
        let persisted = persist_result("edge_persist", self.repo.on_edge_remove(&removed.id));
        Ok(EdgeOutcome {
            edge_id: removed.id,
            persisted,
        })
    }

    /// Discards the open draft. The graph store is untouched.
    pub fn cancel_authoring(&mut self) -> Result<(), WorkbenchError> {
        let mut session = self
            .authoring
            .take()
            .ok_or(WorkbenchError::NoActiveSession)?;
        Ok(session.cancel()?)
    }

    /// Selects a node; unknown ids keep the current selection.
    pub fn select_node(&mut self, id: &NodeId) -> Result<&Node, WorkbenchError> {
        Ok(self.selection.select(&self.store, id)?)
    }

    /// Layout-layer click signal.
    pub fn node_clicked(&mut self, id: &str) -> Result<&Node, WorkbenchError> {
        self.select_node(&NodeId::from(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn current_selection(&self) -> Option<&Node> {
        self.selection.current(&self.store)
    }

    pub fn list_all_nodes(&self) -> &[Node] {
        self.store.list_all()
    }

    pub fn get_node(&self, id: &NodeId) -> Result<&Node, WorkbenchError> {
        Ok(self.store.get(id)?)
    }

    pub fn search_nodes(&self, query: &NodeSearch) -> Vec<&Node> {
        self.store.search(query)
    }

    pub fn list_edges(&self) -> &[Edge] {
        self.store.edges()
    }

    /// Edges touching `node`, for the detail panel.
    pub fn edges_of(&self, node: &NodeId) -> Vec<&Edge> {
        self.store.edges_of(node)
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn session_mut(&mut self) -> Result<&mut AuthoringSession, WorkbenchError> {
        self.authoring
            .as_mut()
            .filter(|session| session.is_open())
            .ok_or(WorkbenchError::NoActiveSession)
    }
}

fn persist_result(event: &str, result: RepoResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!("event={event} module=workbench status=error error={err}");
            false
        }
    }
}
