use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::notify::Notifier;
use super::provider::{HierarchicalTreeProvider, TreeNode};
use crate::directory::BusinessObjectDirectory;
use crate::models::InventoryObjectRef;

/// A materialized part of a navigation tree, used for rendering and API responses.
///
/// The object fields are flattened into the JSON response, with an additional
/// `children` array containing nested snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeSnapshot {
    #[serde(flatten)]
    pub object: InventoryObjectRef,
    pub children: Vec<TreeSnapshot>,
}

/// The consumer side of a [`HierarchicalTreeProvider`]: remembers which nodes
/// were expanded and what they contained.
///
/// A node's children are fetched on its first expansion only. Cached levels
/// stay until [`ExpandedTree::invalidate`] rebuilds the tree.
pub struct ExpandedTree<D, N> {
    provider: HierarchicalTreeProvider<D, N>,
    children: HashMap<InventoryObjectRef, Vec<TreeNode>>,
}

impl<D: BusinessObjectDirectory, N: Notifier> ExpandedTree<D, N> {
    pub fn new(provider: HierarchicalTreeProvider<D, N>) -> Self {
        Self {
            provider,
            children: HashMap::new(),
        }
    }

    pub fn root(&self) -> TreeNode {
        TreeNode::new(self.provider.root().clone())
    }

    pub fn expand(&mut self, node: &TreeNode) -> &[TreeNode] {
        let provider = &self.provider;
        self.children
            .entry(node.object.clone())
            .or_insert_with(|| provider.fetch_children(Some(node)))
    }

    pub fn is_expanded(&self, node: &TreeNode) -> bool {
        self.children.contains_key(&node.object)
    }

    /// Forget every fetched level.
    pub fn invalidate(&mut self) {
        self.children.clear();
    }

    /// Expand from the root down to `depth` levels below it.
    ///
    /// A node that already appears on its own path from the root (special
    /// relationships may loop back) is emitted as a leaf.
    pub fn snapshot(&mut self, depth: usize) -> TreeSnapshot {
        let root = self.root();
        let mut path = HashSet::new();
        self.snapshot_node(&root, depth, &mut path)
    }

    fn snapshot_node(
        &mut self,
        node: &TreeNode,
        depth: usize,
        path: &mut HashSet<InventoryObjectRef>,
    ) -> TreeSnapshot {
        let mut children = Vec::new();
        if depth > 0 && path.insert(node.object.clone()) {
            let nodes = self.expand(node).to_vec();
            for child in &nodes {
                children.push(self.snapshot_node(child, depth - 1, path));
            }
            path.remove(&node.object);
        }

        TreeSnapshot {
            object: node.object.clone(),
            children,
        }
    }
}
