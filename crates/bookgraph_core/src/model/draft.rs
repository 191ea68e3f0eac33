//! Draft model backing the node authoring form.
//!
//! # Responsibility
//! - Hold raw, unvalidated user input for one node under construction.
//! - Manage repeatable link/detail slots addressed by stable tokens.
//!
//! # Invariants
//! - Slot tokens are unique within a draft and never reused, even after removal.
//! - Removing a slot keeps the relative order of the remaining slots.
//! - Adding a slot never pre-fills its content.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable handle of one link/detail slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotToken(u64);

impl Display for SlotToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Scalar draft fields editable through `set_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Author,
    Year,
    /// Comma-separated tag input.
    Tags,
    Abstract,
    Notes,
    Color,
}

impl DraftField {
    /// Stable field name used by form bindings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
            Self::Tags => "tags",
            Self::Abstract => "abstract",
            Self::Notes => "notes",
            Self::Color => "color",
        }
    }
}

/// Returned when a form binding names a field the draft does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDraftField(pub String);

impl Display for UnknownDraftField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown draft field `{}`", self.0)
    }
}

impl Error for UnknownDraftField {}

impl FromStr for DraftField {
    type Err = UnknownDraftField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "year" => Ok(Self::Year),
            "tags" => Ok(Self::Tags),
            "abstract" => Ok(Self::Abstract),
            "notes" => Ok(Self::Notes),
            "color" | "colour" => Ok(Self::Color),
            other => Err(UnknownDraftField(other.to_string())),
        }
    }
}

/// One link slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSlot {
    pub token: SlotToken,
    pub url: String,
}

/// One detail key/value slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSlot {
    pub token: SlotToken,
    pub key: String,
    pub value: String,
}

impl DetailSlot {
    /// Both sides blank after trim.
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty()
    }
}

/// Mutable, partial node under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub author: String,
    pub year: String,
    pub tags: String,
    pub abstract_text: String,
    pub notes: String,
    pub color: String,
    links: Vec<LinkSlot>,
    details: Vec<DetailSlot>,
    next_token: u64,
}

impl Draft {
    /// Creates an empty draft with no slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces one scalar field with raw input. No validation here.
    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Title => self.title = value,
            DraftField::Author => self.author = value,
            DraftField::Year => self.year = value,
            DraftField::Tags => self.tags = value,
            DraftField::Abstract => self.abstract_text = value,
            DraftField::Notes => self.notes = value,
            DraftField::Color => self.color = value,
        }
    }

    /// Reads one scalar field's raw input.
    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Author => &self.author,
            DraftField::Year => &self.year,
            DraftField::Tags => &self.tags,
            DraftField::Abstract => &self.abstract_text,
            DraftField::Notes => &self.notes,
            DraftField::Color => &self.color,
        }
    }

    pub fn links(&self) -> &[LinkSlot] {
        &self.links
    }

    pub fn details(&self) -> &[DetailSlot] {
        &self.details
    }

    /// Appends an empty link slot and returns its token.
    pub fn add_link_slot(&mut self) -> SlotToken {
        let token = self.issue_token();
        self.links.push(LinkSlot {
            token,
            url: String::new(),
        });
        token
    }

    /// Sets the URL text of one link slot. Returns `false` for unknown tokens.
    pub fn set_link(&mut self, token: SlotToken, url: impl Into<String>) -> bool {
        match self.links.iter_mut().find(|slot| slot.token == token) {
            Some(slot) => {
                slot.url = url.into();
                true
            }
            None => false,
        }
    }

    /// Removes one link slot. Returns `false` for unknown tokens.
    pub fn remove_link_slot(&mut self, token: SlotToken) -> bool {
        let before = self.links.len();
        self.links.retain(|slot| slot.token != token);
        self.links.len() != before
    }

    /// Appends an empty detail slot and returns its token.
    pub fn add_detail_slot(&mut self) -> SlotToken {
        let token = self.issue_token();
        self.details.push(DetailSlot {
            token,
            key: String::new(),
            value: String::new(),
        });
        token
    }

    /// Sets key and value of one detail slot. Returns `false` for unknown tokens.
    pub fn set_detail(
        &mut self,
        token: SlotToken,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        match self.details.iter_mut().find(|slot| slot.token == token) {
            Some(slot) => {
                slot.key = key.into();
                slot.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Removes one detail slot. Returns `false` for unknown tokens.
    pub fn remove_detail_slot(&mut self, token: SlotToken) -> bool {
        let before = self.details.len();
        self.details.retain(|slot| slot.token != token);
        self.details.len() != before
    }

    fn issue_token(&mut self) -> SlotToken {
        let token = SlotToken(self.next_token);
        self.next_token += 1;
        token
    }
}
