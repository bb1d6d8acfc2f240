//! Lazy, one-level-at-a-time adapter from the object directory to a tree consumer.

use serde::{Deserialize, Serialize};

use super::notify::{Notification, Notifier, TracingNotifier};
use crate::directory::BusinessObjectDirectory;
use crate::models::InventoryObjectRef;

/// Which containment edge the provider follows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentRelation {
    /// The primary parent/child containment tree.
    #[default]
    Regular,
    /// Special relationships (logical associations outside the containment tree).
    Special,
}

impl ContainmentRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Special => "special",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Self::Regular),
            "special" => Some(Self::Special),
            _ => None,
        }
    }
}

/// One displayed entry of a navigation tree.
///
/// Children are not stored on the node; a consumer asks the provider for them
/// on expansion and caches them itself (see [`super::ExpandedTree`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeNode {
    pub object: InventoryObjectRef,
}

impl TreeNode {
    pub fn new(object: InventoryObjectRef) -> Self {
        Self { object }
    }

    pub fn is_placeholder(&self) -> bool {
        self.object.is_placeholder()
    }
}

/// Presents the containment hierarchy under `root` as an incrementally fetched tree.
///
/// Lookup failures never reach the caller: a failed fetch yields no children and
/// raises a [`Notification`], a failed count yields zero. Every node advertises
/// children; an empty fetch is how a leaf shows up.
pub struct HierarchicalTreeProvider<D, N = TracingNotifier> {
    directory: D,
    root: InventoryObjectRef,
    relation: ContainmentRelation,
    limit: i64,
    notifier: N,
}

impl<D: BusinessObjectDirectory> HierarchicalTreeProvider<D, TracingNotifier> {
    pub fn new(directory: D, root: InventoryObjectRef, relation: ContainmentRelation) -> Self {
        Self::with_notifier(directory, root, relation, TracingNotifier)
    }
}

impl<D: BusinessObjectDirectory, N: Notifier> HierarchicalTreeProvider<D, N> {
    pub fn with_notifier(
        directory: D,
        root: InventoryObjectRef,
        relation: ContainmentRelation,
        notifier: N,
    ) -> Self {
        Self {
            directory,
            root,
            relation,
            limit: 0,
            notifier,
        }
    }

    /// Cap the number of regular children fetched per node. Zero or less fetches all.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn root(&self) -> &InventoryObjectRef {
        &self.root
    }

    pub fn relation(&self) -> ContainmentRelation {
        self.relation
    }

    pub fn fetch_children(&self, parent: Option<&TreeNode>) -> Vec<TreeNode> {
        let Some(parent) = parent else {
            return vec![TreeNode::new(self.root.clone())];
        };
        if parent.is_placeholder() {
            return Vec::new();
        }

        let object = &parent.object;
        let result = match self.relation {
            ContainmentRelation::Regular => {
                self.directory
                    .get_object_children(&object.class_name, &object.id, self.limit)
            }
            ContainmentRelation::Special => self
                .directory
                .get_object_special_children(&object.class_name, &object.id),
        };

        match result {
            Ok(children) => children.into_iter().map(TreeNode::new).collect(),
            Err(e) => {
                self.notifier.notify(Notification {
                    title: "Could not load children".to_string(),
                    message: e.to_string(),
                    object: Some(object.clone()),
                });
                Vec::new()
            }
        }
    }

    pub fn child_count(&self, parent: Option<&TreeNode>) -> usize {
        let Some(parent) = parent else {
            return 1;
        };

        let object = &parent.object;
        let result = match self.relation {
            ContainmentRelation::Regular => self
                .directory
                .get_object_children_count(&object.class_name, &object.id, None)
                .map(|count| count as usize),
            ContainmentRelation::Special => self
                .directory
                .get_object_special_children(&object.class_name, &object.id)
                .map(|children| children.len()),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!("Child count for {} failed: {}", object, e);
            0
        })
    }

    pub fn has_children(&self, _node: &TreeNode) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use super::*;
    use crate::directory::{DirectoryError, DirectoryResult};
    use crate::tree::CollectingNotifier;

    /// In-memory directory keyed by `(class, id)`.
    #[derive(Default)]
    struct StubDirectory {
        children: HashMap<(String, String), Vec<InventoryObjectRef>>,
        special: HashMap<(String, String), Vec<InventoryObjectRef>>,
        broken: Vec<(String, String)>,
        calls: Cell<usize>,
    }

    impl StubDirectory {
        fn with_children(mut self, parent: &InventoryObjectRef, kids: Vec<InventoryObjectRef>) -> Self {
            self.children
                .insert((parent.class_name.clone(), parent.id.clone()), kids);
            self
        }

        fn with_special(mut self, parent: &InventoryObjectRef, kids: Vec<InventoryObjectRef>) -> Self {
            self.special
                .insert((parent.class_name.clone(), parent.id.clone()), kids);
            self
        }

        fn broken(mut self, class_name: &str, id: &str) -> Self {
            self.broken.push((class_name.to_string(), id.to_string()));
            self
        }

        fn check(&self, class_name: &str, id: &str) -> DirectoryResult<(String, String)> {
            self.calls.set(self.calls.get() + 1);
            let key = (class_name.to_string(), id.to_string());
            if self.broken.contains(&key) {
                return Err(DirectoryError::object_not_found(class_name, id));
            }
            Ok(key)
        }
    }

    impl BusinessObjectDirectory for StubDirectory {
        fn get_object_children(
            &self,
            class_name: &str,
            id: &str,
            limit: i64,
        ) -> DirectoryResult<Vec<InventoryObjectRef>> {
            let key = self.check(class_name, id)?;
            let mut kids = self.children.get(&key).cloned().unwrap_or_default();
            if limit > 0 {
                kids.truncate(limit as usize);
            }
            Ok(kids)
        }

        fn get_object_children_count(
            &self,
            class_name: &str,
            id: &str,
            _filter: Option<&str>,
        ) -> DirectoryResult<u64> {
            let key = self.check(class_name, id)?;
            Ok(self.children.get(&key).map_or(0, |kids| kids.len() as u64))
        }

        fn get_object_special_children(
            &self,
            class_name: &str,
            id: &str,
        ) -> DirectoryResult<Vec<InventoryObjectRef>> {
            let key = self.check(class_name, id)?;
            Ok(self.special.get(&key).cloned().unwrap_or_default())
        }

        fn get_parents(&self, _class_name: &str, _id: &str) -> DirectoryResult<Vec<InventoryObjectRef>> {
            Ok(Vec::new())
        }
    }

    fn building() -> InventoryObjectRef {
        InventoryObjectRef::new("Building", "1", "HQ")
    }

    fn rooms() -> Vec<InventoryObjectRef> {
        vec![
            InventoryObjectRef::new("Room", "2", "Room 101"),
            InventoryObjectRef::new("Room", "3", "Room 102"),
        ]
    }

    #[test]
    fn test_root_query_is_restartable() {
        let provider =
            HierarchicalTreeProvider::new(StubDirectory::default(), building(), ContainmentRelation::Regular);

        for _ in 0..3 {
            assert_eq!(provider.fetch_children(None), vec![TreeNode::new(building())]);
        }
        assert_eq!(provider.child_count(None), 1);
    }

    #[test]
    fn test_children_keep_backend_order() {
        let directory = StubDirectory::default().with_children(&building(), rooms());
        let provider = HierarchicalTreeProvider::new(directory, building(), ContainmentRelation::Regular);

        let children = provider.fetch_children(Some(&TreeNode::new(building())));
        let ids: Vec<_> = children.iter().map(|n| n.object.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(provider.child_count(Some(&TreeNode::new(building()))), 2);
    }

    #[test]
    fn test_placeholder_has_no_children_without_backend_call() {
        let directory = StubDirectory::default();
        let provider = HierarchicalTreeProvider::new(
            &directory,
            InventoryObjectRef::placeholder("Navigation"),
            ContainmentRelation::Regular,
        );

        let placeholder = TreeNode::new(InventoryObjectRef::placeholder("Navigation"));
        assert!(provider.fetch_children(Some(&placeholder)).is_empty());
        assert_eq!(directory.calls.get(), 0);

        // Counting is left to the backend, which knows nothing under an empty class
        assert_eq!(provider.child_count(Some(&placeholder)), 0);
        assert_eq!(directory.calls.get(), 1);
    }

    #[test]
    fn test_backend_failure_degrades_to_empty() {
        let directory = StubDirectory::default()
            .with_children(&building(), rooms())
            .broken("Building", "1");
        let notifier = CollectingNotifier::new();
        let provider = HierarchicalTreeProvider::with_notifier(
            directory,
            building(),
            ContainmentRelation::Regular,
            &notifier,
        );

        let node = TreeNode::new(building());
        assert!(provider.fetch_children(Some(&node)).is_empty());
        assert_eq!(provider.child_count(Some(&node)), 0);

        let notifications = notifier.take();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].object, Some(building()));
        assert!(notifications[0].message.contains("not found"));
    }

    #[test]
    fn test_special_relation_uses_special_children() {
        let service = InventoryObjectRef::new("Service", "9", "Internet");
        let directory = StubDirectory::default()
            .with_children(&building(), rooms())
            .with_special(&building(), vec![service.clone()]);
        let provider = HierarchicalTreeProvider::new(directory, building(), ContainmentRelation::Special);

        let node = TreeNode::new(building());
        assert_eq!(provider.fetch_children(Some(&node)), vec![TreeNode::new(service)]);
        assert_eq!(provider.child_count(Some(&node)), 1);
    }

    #[test]
    fn test_limit_is_passed_to_backend() {
        let directory = StubDirectory::default().with_children(&building(), rooms());
        let provider =
            HierarchicalTreeProvider::new(directory, building(), ContainmentRelation::Regular).with_limit(1);

        let children = provider.fetch_children(Some(&TreeNode::new(building())));
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].object.id, "2");
    }

    #[test]
    fn test_every_node_advertises_children() {
        let provider =
            HierarchicalTreeProvider::new(StubDirectory::default(), building(), ContainmentRelation::Regular);

        assert!(provider.has_children(&TreeNode::new(building())));
        assert!(provider.has_children(&TreeNode::new(InventoryObjectRef::placeholder(""))));
        assert!(provider.has_children(&TreeNode::new(InventoryObjectRef::new("Port", "x", "eth0"))));
    }

    #[test]
    fn test_relation_parsing() {
        assert_eq!(ContainmentRelation::from_str("special"), Some(ContainmentRelation::Special));
        assert_eq!(ContainmentRelation::from_str("regular"), Some(ContainmentRelation::Regular));
        assert_eq!(ContainmentRelation::from_str("physical"), None);
        assert_eq!(ContainmentRelation::Special.as_str(), "special");
    }
}
