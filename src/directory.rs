//! Collaborator interfaces to the persistence layer.
//!
//! The tree provider and the action registry only ever see these traits. The
//! SQLite implementation lives in [`crate::db`]; tests substitute stubs.

use thiserror::Error;

use crate::models::InventoryObjectRef;

/// Failures reported by the business object directory and the metadata oracle.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Object not found: {class_name} with id {id}")]
    ObjectNotFound { class_name: String, id: String },

    #[error("Class not found: {0}")]
    MetadataNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl DirectoryError {
    pub fn object_not_found(class_name: &str, id: &str) -> Self {
        Self::ObjectNotFound {
            class_name: class_name.to_string(),
            id: id.to_string(),
        }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Parent/child queries over the business object containment graph.
pub trait BusinessObjectDirectory {
    /// Direct children of an object in insertion order. A `limit` of zero or
    /// less returns every child.
    fn get_object_children(
        &self,
        class_name: &str,
        id: &str,
        limit: i64,
    ) -> DirectoryResult<Vec<InventoryObjectRef>>;

    /// Number of direct children, optionally only those of `filter` or its subclasses.
    fn get_object_children_count(
        &self,
        class_name: &str,
        id: &str,
        filter: Option<&str>,
    ) -> DirectoryResult<u64>;

    /// Objects reachable through special relationships from this object.
    fn get_object_special_children(
        &self,
        class_name: &str,
        id: &str,
    ) -> DirectoryResult<Vec<InventoryObjectRef>>;

    /// Containment ancestors, nearest first.
    fn get_parents(&self, class_name: &str, id: &str) -> DirectoryResult<Vec<InventoryObjectRef>>;
}

/// Answers class hierarchy questions.
pub trait SubclassOracle {
    /// Whether `candidate` is `ancestor` or inherits from it. Fails with
    /// [`DirectoryError::MetadataNotFound`] if either class is unknown.
    fn is_subclass_of(&self, candidate: &str, ancestor: &str) -> DirectoryResult<bool>;
}

impl<T: BusinessObjectDirectory + ?Sized> BusinessObjectDirectory for &T {
    fn get_object_children(
        &self,
        class_name: &str,
        id: &str,
        limit: i64,
    ) -> DirectoryResult<Vec<InventoryObjectRef>> {
        (**self).get_object_children(class_name, id, limit)
    }

    fn get_object_children_count(
        &self,
        class_name: &str,
        id: &str,
        filter: Option<&str>,
    ) -> DirectoryResult<u64> {
        (**self).get_object_children_count(class_name, id, filter)
    }

    fn get_object_special_children(
        &self,
        class_name: &str,
        id: &str,
    ) -> DirectoryResult<Vec<InventoryObjectRef>> {
        (**self).get_object_special_children(class_name, id)
    }

    fn get_parents(&self, class_name: &str, id: &str) -> DirectoryResult<Vec<InventoryObjectRef>> {
        (**self).get_parents(class_name, id)
    }
}

impl<T: SubclassOracle + ?Sized> SubclassOracle for &T {
    fn is_subclass_of(&self, candidate: &str, ancestor: &str) -> DirectoryResult<bool> {
        (**self).is_subclass_of(candidate, ancestor)
    }
}
