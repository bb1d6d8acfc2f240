use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::object::InventoryObjectRef;

/// A secondary, non-containment edge between two business objects.
///
/// Special relationships model logical associations (a service using a
/// circuit, a contract covering a device) that sit outside the physical
/// parent/child tree. The source side sees the target as a special child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialRelationship {
    pub id: String,
    pub name: String,
    pub source: InventoryObjectRef,
    pub target: InventoryObjectRef,
    pub created_at: DateTime<Utc>,
}

/// Input for relating an object (given by the request path) to a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelationshipInput {
    pub name: String,
    pub target_class: String,
    pub target_id: String,
}
