//! Core domain logic for BookGraph.
//! This crate is the single source of truth for the reference graph, node
//! authoring and selection state; rendering and layout live elsewhere.

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use graph::search::NodeSearch;
pub use graph::store::{slugify, GraphError, GraphResult, GraphStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::draft::{Draft, DraftField, SlotToken, UnknownDraftField};
pub use model::edge::{normalize_note, Edge, EdgeId};
pub use model::node::{Detail, Node, NodeId, NormalizedNode};
pub use model::validation::{validate, ValidationErrors, ValidationIssue};
pub use repo::node_repo::{
    DetachedRepository, NodeRepository, RepoError, RepoResult, SqliteNodeRepository,
};
pub use service::authoring::{AuthoringError, AuthoringSession};
pub use service::selection::{Selection, SelectionController};
pub use service::workbench::{CommitOutcome, EdgeOutcome, Workbench, WorkbenchError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
