//! Selection controller for the node detail panel.
//!
//! # Responsibility
//! - Track which node, if any, is currently inspected.
//! - Resolve the selected node for the detail-panel renderer.
//!
//! # Invariants
//! - Selecting an unknown id leaves the current selection unchanged.
//! - Only ids that resolved in the store are ever held.

use crate::graph::store::{GraphResult, GraphStore};
use crate::model::node::{Node, NodeId};
use log::debug;

/// Selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(NodeId),
}

/// Long-lived selection state for one UI session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    state: Selection,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id` when it exists and returns the full node.
    ///
    /// # Errors
    /// - Returns `NotFound` and keeps the previous selection when `id` is unknown.
    pub fn select<'store>(
        &mut self,
        store: &'store GraphStore,
        id: &NodeId,
    ) -> GraphResult<&'store Node> {
        let node = store.get(id)?;
        debug!("event=node_select module=selection status=ok");
        self.state = Selection::Selected(node.id.clone());
        Ok(node)
    }

    /// Drops the current selection.
    pub fn clear(&mut self) {
        self.state = Selection::Unselected;
    }

    /// Node shown in the detail panel, if any.
    pub fn current<'store>(&self, store: &'store GraphStore) -> Option<&'store Node> {
        match &self.state {
            Selection::Selected(id) => store.get(id).ok(),
            Selection::Unselected => None,
        }
    }

    pub fn selected_id(&self) -> Option<&NodeId> {
        match &self.state {
            Selection::Selected(id) => Some(id),
            Selection::Unselected => None,
        }
    }

    pub fn state(&self) -> &Selection {
        &self.state
    }
}
