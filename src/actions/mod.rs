//! Pluggable actions and the catalogue that decides where they show up.
//!
//! Modules contribute [`InventoryAction`]s at startup through an
//! [`ActionRegistryBuilder`]. Once every module has registered, the builder is
//! frozen into an immutable [`ActionRegistry`] shared by menu and toolbar
//! builders.

pub mod builtin;
mod registry;

use serde::{Deserialize, Serialize};

pub use registry::*;

/// The role an action plays in menus.
///
/// Delete and relationship-management actions get dedicated menu sections;
/// everything else is miscellaneous.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Misc,
    Delete,
    RelationshipManagement,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [Self::Misc, Self::Delete, Self::RelationshipManagement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Misc => "misc",
            Self::Delete => "delete",
            Self::RelationshipManagement => "relationship_management",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "misc" => Some(Self::Misc),
            "delete" => Some(Self::Delete),
            "relationship_management" => Some(Self::RelationshipManagement),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Misc => 0,
            Self::Delete => 1,
            Self::RelationshipManagement => 2,
        }
    }
}

/// A unit of pluggable behavior offered on inventory objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryAction {
    pub id: String,
    pub label: String,
    /// Class the action is meant for. `None` offers it regardless of class.
    pub applies_to: Option<String>,
    pub kind: ActionKind,
}

impl InventoryAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            applies_to: None,
            kind,
        }
    }

    pub fn applies_to(mut self, class_name: impl Into<String>) -> Self {
        self.applies_to = Some(class_name.into());
        self
    }
}
