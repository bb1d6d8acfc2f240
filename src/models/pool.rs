use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping container for business objects.
///
/// Pools organize objects independently of the containment hierarchy. Every
/// item in a pool must be an instance of `class_name` or one of its subclasses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub class_name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePoolInput {
    pub name: String,
    pub description: Option<String>,
    pub class_name: String,
}
