use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reference to a business object held by the directory.
///
/// Two references are the same object when their class name and id match;
/// the display name is carried along for rendering only. A reference with an
/// empty class name is a root placeholder with no backing object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryObjectRef {
    pub class_name: String,
    pub id: String,
    pub name: String,
}

impl InventoryObjectRef {
    pub fn new(
        class_name: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
            name: name.into(),
        }
    }

    /// A reference with no backing object, used as the top of a navigation tree.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            class_name: String::new(),
            id: String::new(),
            name: name.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.class_name.is_empty()
    }
}

impl PartialEq for InventoryObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name && self.id == other.id
    }
}

impl Eq for InventoryObjectRef {}

impl Hash for InventoryObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class_name.hash(state);
        self.id.hash(state);
    }
}

impl std::fmt::Display for InventoryObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.class_name)
    }
}

/// A stored business object with its containment position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessObject {
    pub id: String,
    pub class_name: String,
    pub name: String,
    pub parent_class: Option<String>,
    pub parent_id: Option<String>,
    pub pool_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&BusinessObject> for InventoryObjectRef {
    fn from(object: &BusinessObject) -> Self {
        InventoryObjectRef::new(&object.class_name, &object.id, &object.name)
    }
}

/// Input for creating a business object.
///
/// Leaving both parent fields empty creates a top-level object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateObjectInput {
    pub class_name: String,
    pub name: String,
    pub parent_class: Option<String>,
    pub parent_id: Option<String>,
}
