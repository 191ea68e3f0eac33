//! Node authoring session.
//!
//! # Responsibility
//! - Back the "Add Node" form with a draft and its repeatable slots.
//! - Commit an accepted draft into the graph store.
//!
//! # Invariants
//! - A failed commit leaves the draft exactly as it was.
//! - A committed or cancelled session rejects every further operation.
//! - Cancel never touches the graph store.

use crate::graph::store::GraphStore;
use crate::model::draft::{Draft, DraftField, SlotToken};
use crate::model::node::NodeId;
use crate::model::validation::{validate, ValidationErrors};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authoring error surfaced to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthoringError {
    /// Session was already committed or cancelled.
    Closed,
    /// Slot token does not belong to a live slot.
    UnknownSlot(SlotToken),
    /// Draft failed validation; session is unchanged.
    Validation(ValidationErrors),
}

impl Display for AuthoringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "authoring session is closed"),
            Self::UnknownSlot(token) => write!(f, "unknown draft slot: {token}"),
            Self::Validation(errors) => write!(f, "draft is invalid: {errors}"),
        }
    }
}

impl Error for AuthoringError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for AuthoringError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Open(Draft),
    Committed(NodeId),
    Cancelled,
}

/// Transient authoring session owning one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoringSession {
    state: SessionState,
}

impl AuthoringSession {
    /// Opens a session with an empty draft and no slots.
    pub fn open() -> Self {
        debug!("event=authoring_open module=authoring status=ok");
        Self {
            state: SessionState::Open(Draft::new()),
        }
    }

    /// Current draft, `None` once the session is closed.
    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            SessionState::Open(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    /// Id admitted by this session's successful commit.
    pub fn committed_id(&self) -> Option<&NodeId> {
        match &self.state {
            SessionState::Committed(id) => Some(id),
            _ => None,
        }
    }

    /// Replaces one scalar field. Validation is deferred to commit.
    pub fn set_field(
        &mut self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), AuthoringError> {
        self.open_draft_mut()?.set_field(field, value);
        debug!(
            "event=draft_edit module=authoring status=ok field={}",
            field.as_str()
        );
        Ok(())
    }

    pub fn add_link_slot(&mut self) -> Result<SlotToken, AuthoringError> {
        Ok(self.open_draft_mut()?.add_link_slot())
    }

    pub fn set_link(
        &mut self,
        token: SlotToken,
        url: impl Into<String>,
    ) -> Result<(), AuthoringError> {
        if self.open_draft_mut()?.set_link(token, url) {
            Ok(())
        } else {
            Err(AuthoringError::UnknownSlot(token))
        }
    }

    pub fn remove_link_slot(&mut self, token: SlotToken) -> Result<(), AuthoringError> {
        if self.open_draft_mut()?.remove_link_slot(token) {
            Ok(())
        } else {
            Err(AuthoringError::UnknownSlot(token))
        }
    }

    pub fn add_detail_slot(&mut self) -> Result<SlotToken, AuthoringError> {
        Ok(self.open_draft_mut()?.add_detail_slot())
    }

    pub fn set_detail(
        &mut self,
        token: SlotToken,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), AuthoringError> {
        if self.open_draft_mut()?.set_detail(token, key, value) {
            Ok(())
        } else {
            Err(AuthoringError::UnknownSlot(token))
        }
    }

    pub fn remove_detail_slot(&mut self, token: SlotToken) -> Result<(), AuthoringError> {
        if self.open_draft_mut()?.remove_detail_slot(token) {
            Ok(())
        } else {
            Err(AuthoringError::UnknownSlot(token))
        }
    }

    /// Validates the draft and admits it into `store`.
    ///
    /// # Errors
    /// - `Closed` when the session is no longer open.
    /// - `Validation` with every violated rule; the draft is kept as-is so
    ///   the user can correct it and retry.
    pub fn commit(&mut self, store: &mut GraphStore) -> Result<NodeId, AuthoringError> {
        let record = match validate(self.open_draft()?) {
            Ok(record) => record,
            Err(errors) => {
                info!(
                    "event=authoring_commit module=authoring status=rejected issues={}",
                    errors.codes().join(",")
                );
                return Err(errors.into());
            }
        };

        let id = store.insert(record);
        info!(
            "event=authoring_commit module=authoring status=ok graph_size={}",
            store.len()
        );
        self.state = SessionState::Committed(id.clone());
        Ok(id)
    }

    /// Discards the draft without touching the store.
    pub fn cancel(&mut self) -> Result<(), AuthoringError> {
        self.open_draft_mut()?;
        self.state = SessionState::Cancelled;
        debug!("event=authoring_cancel module=authoring status=ok");
        Ok(())
    }

    fn open_draft(&self) -> Result<&Draft, AuthoringError> {
        match &self.state {
            SessionState::Open(draft) => Ok(draft),
            _ => Err(AuthoringError::Closed),
        }
    }

    fn open_draft_mut(&mut self) -> Result<&mut Draft, AuthoringError> {
        match &mut self.state {
            SessionState::Open(draft) => Ok(draft),
            _ => Err(AuthoringError::Closed),
        }
    }
}
