use std::fmt;

use generational_arena::{Arena, Index};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::attrs::Attrs;
use crate::domain::child_set::ChildSet;
use crate::domain::spec::NodeSpec;

/// Default attribute used by [`TreeArena::find`].
pub const DEFAULT_ID_FIELD: &str = "id";

/// Handle to a node slot in a [`TreeArena`].
///
/// Handles are generational: once the node is removed the handle goes stale and
/// every lookup through it answers as for an absent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// Handle to a child set slot in a [`TreeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildSetId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "node#{}.{}", slot, generation)
    }
}

impl fmt::Display for ChildSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "set#{}.{}", slot, generation)
    }
}

/// Tree vertex stored in the arena.
#[derive(Debug)]
pub struct TreeNode {
    /// Record payload
    pub(crate) attrs: Attrs,
    /// Child set owned by this node, created with it and never absent
    pub(crate) children: ChildSetId,
    /// Child set containing this node, None for a free-standing root
    pub(crate) collection: Option<ChildSetId>,
}

impl TreeNode {
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn children(&self) -> ChildSetId {
        self.children
    }

    pub fn collection(&self) -> Option<ChildSetId> {
        self.collection
    }
}

/// Arena owning every node and child set of one or more trees.
///
/// Parentage is never stored on a node: the parent of `n` is the owner of the
/// child set containing `n`.
#[derive(Debug)]
pub struct TreeArena {
    pub(crate) nodes: Arena<TreeNode>,
    pub(crate) sets: Arena<ChildSet>,
    id_field: String,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self::with_id_field(DEFAULT_ID_FIELD)
    }

    pub fn with_id_field(id_field: impl Into<String>) -> Self {
        Self {
            nodes: Arena::new(),
            sets: Arena::new(),
            id_field: id_field.into(),
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Materialize `spec` as a free-standing root node.
    #[instrument(level = "debug", skip(self, spec))]
    pub fn create(&mut self, spec: NodeSpec) -> NodeId {
        let root = self.materialize(spec);
        debug!(%root, nodes = self.nodes.len(), "created tree");
        root
    }

    /// Allocate the subtree described by `spec`, detached from any set.
    pub(crate) fn materialize(&mut self, spec: NodeSpec) -> NodeId {
        let root = self.alloc_node(spec.attrs);
        let mut stack = vec![(root, spec.nodes)];

        while let Some((parent, child_specs)) = stack.pop() {
            let set = self.nodes[parent.0].children;
            for child in child_specs {
                let child_idx = self.alloc_node(child.attrs);
                self.attach(set, None, child_idx);
                stack.push((child_idx, child.nodes));
            }
        }

        root
    }

    fn alloc_node(&mut self, attrs: Attrs) -> NodeId {
        let set_idx = self.sets.insert(ChildSet::default());
        let node = NodeId(self.nodes.insert(TreeNode {
            attrs,
            children: ChildSetId(set_idx),
            collection: None,
        }));
        self.sets[set_idx].owner = Some(node);
        node
    }

    /// Free `node` and its whole subtree. The node must already be detached.
    pub(crate) fn destroy(&mut self, node: NodeId) -> usize {
        let mut freed = 0;
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(current.0) {
                if let Some(set) = self.sets.remove(removed.children.0) {
                    stack.extend(set.members);
                }
                freed += 1;
            }
        }

        freed
    }

    /// True if `node` refers to a live node.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    /// Number of live nodes across all trees in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_node(&self, node: NodeId) -> Option<&TreeNode> {
        self.nodes.get(node.0)
    }

    pub fn get_set(&self, set: ChildSetId) -> Option<&ChildSet> {
        self.sets.get(set.0)
    }

    pub fn attributes(&self, node: NodeId) -> Option<&Attrs> {
        self.get_node(node).map(TreeNode::attrs)
    }

    /// Detached copy of the node's attributes.
    pub fn snapshot(&self, node: NodeId) -> Option<Attrs> {
        self.attributes(node).cloned()
    }

    pub fn attr(&self, node: NodeId, key: &str) -> Option<&Value> {
        self.attributes(node)?.get(key)
    }

    /// Set one attribute; false for a stale handle.
    pub fn set_attr(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> bool {
        match self.nodes.get_mut(node.0) {
            Some(entry) => {
                entry.attrs.insert(key.into(), value.into());
                true
            }
            None => false,
        }
    }

    /// Direct children in sibling order; empty for leaves and stale handles.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get_node(node)
            .map(|entry| self.set_members(entry.children))
            .unwrap_or(&[])
    }

    /// Pre-order walk of the subtree rooted at `node`.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self, node: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, node)
    }

    /// Levels in the subtree rooted at `node`; 0 for a stale handle.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, node: NodeId) -> usize {
        if self.contains(node) {
            self.calculate_depth(node)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node: NodeId) -> usize {
        1 + self
            .children(node)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Leaves of the subtree rooted at `node`, in document order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.iter(node)
            .filter(|&id| self.children(id).is_empty())
            .collect()
    }

    /// Ancestors of `node` from its root down to the node itself.
    pub fn path(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Rebuild the spec of the subtree rooted at `node`.
    pub fn to_spec(&self, node: NodeId) -> Option<NodeSpec> {
        let entry = self.get_node(node)?;
        Some(NodeSpec {
            attrs: entry.attrs.clone(),
            nodes: self
                .children(node)
                .iter()
                .filter_map(|&child| self.to_spec(child))
                .collect(),
        })
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if arena.contains(start) {
            stack.push(start);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack
            .extend(self.arena.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> (TreeArena, NodeId) {
        let mut tree = TreeArena::new();
        let root = tree.create(
            NodeSpec::from_value(json!({
                "id": "root",
                "nodes": [
                    {"id": "child1", "nodes": [{"id": "grandchild1"}]},
                    {"id": "child2"}
                ]
            }))
            .unwrap(),
        );
        (tree, root)
    }

    fn ids(tree: &TreeArena, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| tree.attr(n, "id").unwrap().as_str().unwrap().to_string())
            .collect()
    }

    // root
    // ├── child1
    // │   └── grandchild1
    // └── child2
    #[test]
    fn given_spec_when_creating_then_structure_is_materialized() {
        let (tree, root) = sample();
        assert_eq!(tree.len(), 4);
        assert_eq!(ids(&tree, tree.children(root)), vec!["child1", "child2"]);
        assert_eq!(tree.get_node(root).unwrap().collection(), None);

        let child1 = tree.children(root)[0];
        let set = tree.get_node(root).unwrap().children();
        assert_eq!(tree.get_node(child1).unwrap().collection(), Some(set));
        assert_eq!(tree.get_set(set).unwrap().owner(), Some(root));
    }

    #[test]
    fn given_tree_when_iterating_then_preorder() {
        let (tree, root) = sample();
        let order: Vec<_> = tree.iter(root).collect();
        assert_eq!(ids(&tree, &order), vec!["root", "child1", "grandchild1", "child2"]);
    }

    #[test]
    fn given_tree_when_measuring_then_depth_and_leaves() {
        let (tree, root) = sample();
        assert_eq!(tree.depth(root), 3);
        assert_eq!(ids(&tree, &tree.leaf_nodes(root)), vec!["grandchild1", "child2"]);
    }

    #[test]
    fn given_node_when_path_then_root_first() {
        let (tree, root) = sample();
        let grandchild = tree.children(tree.children(root)[0])[0];
        assert_eq!(
            ids(&tree, &tree.path(grandchild)),
            vec!["root", "child1", "grandchild1"]
        );
    }

    #[test]
    fn given_tree_when_to_spec_then_round_trips_structure() {
        let (tree, root) = sample();
        let spec = tree.to_spec(root).unwrap();
        assert_eq!(spec.count(), 4);
        assert_eq!(spec.nodes[0].nodes[0].attrs.get("id"), Some(&json!("grandchild1")));
    }

    #[test]
    fn given_node_when_setting_attr_then_visible_in_snapshot() {
        let (mut tree, root) = sample();
        assert!(tree.set_attr(root, "color", "red"));
        let snapshot = tree.snapshot(root).unwrap();
        assert_eq!(snapshot.get("color"), Some(&json!("red")));
    }
}
