use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for an inventory class.
///
/// Classes form a single-inheritance hierarchy through `parent_name`. Abstract
/// classes (e.g. `GenericNetworkElement`) exist only to be inherited from and
/// cannot be instantiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryClass {
    pub name: String,
    pub parent_name: Option<String>,
    pub display_name: Option<String>,
    pub is_abstract: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassInput {
    pub name: String,
    /// Superclass. `None` creates a hierarchy root.
    pub parent_name: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
}
