//! Node-level navigation, search and structural mutation.
//!
//! Sibling context (index, next, prev, insertion) is always resolved through the
//! child set containing the node, and recursive search goes back through each
//! child node, so moving a node only ever swaps its containing set.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::arena::{ChildSetId, NodeId, TreeArena};
use crate::domain::attrs::Query;
use crate::domain::child_set::Depth;
use crate::domain::query::NodeSet;
use crate::domain::spec::NodeSpec;

/// Which matches [`TreeArena::remove_where`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Removal {
    /// The node `find_where` would return
    First,
    /// Every node `where_all` would return
    #[default]
    All,
}

impl TreeArena {
    pub fn matches(&self, node: NodeId, query: &Query) -> bool {
        self.attributes(node)
            .map(|attrs| query.matches(attrs))
            .unwrap_or(false)
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    /// Owner of the child set containing `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let set = self.get_node(node)?.collection?;
        self.set_owner(set)
    }

    /// True for a live node that is not contained in any set, or whose
    /// containing set has no owner.
    pub fn is_root(&self, node: NodeId) -> bool {
        self.contains(node) && self.parent(node).is_none()
    }

    /// Topmost ancestor; the node itself when it is a root.
    #[instrument(level = "trace", skip(self))]
    pub fn root(&self, node: NodeId) -> Option<NodeId> {
        if !self.contains(node) {
            return None;
        }
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// The node's child set when it has at least one child.
    pub fn nodes(&self, node: NodeId) -> Option<ChildSetId> {
        let set = self.get_node(node)?.children;
        (self.set_len(set) > 0).then_some(set)
    }

    /// Position among siblings; None for roots.
    pub fn index(&self, node: NodeId) -> Option<usize> {
        self.sibling_slot(node).map(|(_, index)| index)
    }

    pub fn next(&self, node: NodeId) -> Option<NodeId> {
        let (set, index) = self.sibling_slot(node)?;
        self.set_at(set, index + 1)
    }

    pub fn prev(&self, node: NodeId) -> Option<NodeId> {
        let (set, index) = self.sibling_slot(node)?;
        self.set_at(set, index.checked_sub(1)?)
    }

    fn sibling_slot(&self, node: NodeId) -> Option<(ChildSetId, usize)> {
        if self.is_root(node) {
            return None;
        }
        let set = self.get_node(node)?.collection?;
        Some((set, self.set_index_of(set, node)?))
    }

    // ---------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------

    /// First descendant-or-self whose id field equals `id`.
    pub fn find(&self, node: NodeId, id: impl Into<Value>) -> Option<NodeId> {
        let query = Query::by_id(self.id_field(), id);
        self.find_where(node, &query)
    }

    /// First descendant-or-self matching `query`.
    ///
    /// Order: the node itself, then its direct children, then each child's
    /// subtree in sibling order. A depth-1 match therefore wins over any deeper
    /// one, even one sitting under an earlier sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn find_where(&self, node: NodeId, query: &Query) -> Option<NodeId> {
        self.find_where_from(node, query, true)
    }

    fn find_where_from(
        &self,
        node: NodeId,
        query: &Query,
        include_self: bool,
    ) -> Option<NodeId> {
        let entry = self.get_node(node)?;
        if include_self && query.matches(&entry.attrs) {
            return Some(node);
        }
        // depth-1 is covered by the set lookup, so recursion skips the self check
        self.set_find_where(entry.children, query).or_else(|| {
            self.children(node)
                .iter()
                .find_map(|&child| self.find_where_from(child, query, false))
        })
    }

    /// Every descendant-or-self matching `query`, deduplicated, in discovery
    /// order: self, direct children, then each child's subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn where_all(&self, node: NodeId, query: &Query) -> NodeSet {
        let mut found = Vec::new();
        self.collect_where(node, query, true, &mut found);
        found.into_iter().collect()
    }

    /// Like [`TreeArena::where_all`] with the node itself left out.
    #[instrument(level = "debug", skip(self))]
    pub fn where_descendants(&self, node: NodeId, query: &Query) -> NodeSet {
        let mut found = Vec::new();
        self.collect_where(node, query, false, &mut found);
        found.into_iter().collect()
    }

    fn collect_where(
        &self,
        node: NodeId,
        query: &Query,
        include_self: bool,
        found: &mut Vec<NodeId>,
    ) {
        let Some(entry) = self.get_node(node) else {
            return;
        };
        if include_self && query.matches(&entry.attrs) {
            found.push(node);
        }
        found.extend(self.set_where(entry.children, query, Depth::Shallow));
        for &child in self.children(node) {
            self.collect_where(child, query, false, found);
        }
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Detach `node` from its containing set and destroy its subtree.
    ///
    /// Returns false, leaving the tree untouched, for roots and stale handles.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, node: NodeId) -> bool {
        if !self.contains(node) {
            debug!("node already removed");
            return false;
        }
        if self.is_root(node) {
            debug!("refusing to remove root node");
            return false;
        }
        if self.detach(node).is_none() {
            return false;
        }
        let freed = self.destroy(node);
        debug!(freed, "removed subtree");
        true
    }

    /// Remove the first match or all matches of `query` under `node`
    /// (self included). Returns how many matched nodes were removed; matches
    /// already destroyed with an earlier ancestor are skipped.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_where(&mut self, node: NodeId, query: &Query, mode: Removal) -> usize {
        match mode {
            Removal::First => self
                .find_where(node, query)
                .map_or(0, |hit| usize::from(self.remove(hit))),
            Removal::All => {
                let matches = self.where_all(node, query);
                matches.iter().filter(|&&hit| self.remove(hit)).count()
            }
        }
    }

    /// Append children built from `specs`; returns their handles.
    #[instrument(level = "debug", skip(self, specs))]
    pub fn add<I>(&mut self, node: NodeId, specs: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        let Some(set) = self.get_node(node).map(|entry| entry.children) else {
            debug!("node already removed, nothing added");
            return Vec::new();
        };
        self.insert_specs(set, None, specs)
    }

    /// Insert siblings right before `node`. No-op for roots.
    #[instrument(level = "debug", skip(self, specs))]
    pub fn insert_before<I>(&mut self, node: NodeId, specs: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        match self.sibling_slot(node) {
            Some((set, index)) => self.insert_specs(set, Some(index), specs),
            None => {
                debug!("no sibling order around a root, nothing inserted");
                Vec::new()
            }
        }
    }

    /// Insert siblings right after `node`. No-op for roots.
    #[instrument(level = "debug", skip(self, specs))]
    pub fn insert_after<I>(&mut self, node: NodeId, specs: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        match self.sibling_slot(node) {
            Some((set, index)) => self.insert_specs(set, Some(index + 1), specs),
            None => {
                debug!("no sibling order around a root, nothing inserted");
                Vec::new()
            }
        }
    }

    /// Reparent `node` under `new_parent` at `at` (end when None).
    ///
    /// `at` is read after `node` has left its old set. Refused when
    /// `new_parent` lies inside `node`'s own subtree or a handle is stale.
    #[instrument(level = "debug", skip(self))]
    pub fn move_to(&mut self, node: NodeId, new_parent: NodeId, at: Option<usize>) -> bool {
        let Some(target) = self.get_node(new_parent).map(|entry| entry.children) else {
            return false;
        };
        if !self.contains(node) || self.path(new_parent).contains(&node) {
            debug!("refusing to move node into its own subtree");
            return false;
        }
        self.detach(node);
        self.attach(target, at, node);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree_of(value: Value) -> (TreeArena, NodeId) {
        let mut tree = TreeArena::new();
        let root = tree.create(NodeSpec::from_value(value).unwrap());
        (tree, root)
    }

    #[test]
    fn given_stale_handle_when_navigating_then_everything_absent() {
        let (mut tree, root) = tree_of(json!({"id": "a", "nodes": [{"id": "b"}]}));
        let b = tree.find(root, "b").unwrap();
        assert!(tree.remove(b));

        assert!(!tree.contains(b));
        assert!(!tree.is_root(b));
        assert_eq!(tree.root(b), None);
        assert_eq!(tree.parent(b), None);
        assert_eq!(tree.index(b), None);
        assert!(tree.where_all(b, &Query::new()).is_empty());
        assert!(tree.add(b, [NodeSpec::default()]).is_empty());
        assert!(!tree.remove(b));
    }

    #[test]
    fn given_custom_id_field_when_find_then_uses_it() {
        let mut tree = TreeArena::with_id_field("key");
        let root = tree.create(
            NodeSpec::from_value(json!({"key": 1, "nodes": [{"key": 2}]})).unwrap(),
        );
        let hit = tree.find(root, 2).unwrap();
        assert_eq!(tree.parent(hit), Some(root));
        assert_eq!(tree.find(root, "2"), None);
    }

    #[test]
    fn given_leaf_when_nodes_then_none() {
        let (tree, root) = tree_of(json!({"id": "a", "nodes": [{"id": "b"}]}));
        let b = tree.find(root, "b").unwrap();
        assert_eq!(tree.nodes(b), None);
        let set = tree.nodes(root).unwrap();
        assert_eq!(tree.set_members(set), &[b]);
    }

    #[test]
    fn given_node_when_moving_under_own_descendant_then_refused() {
        let (mut tree, root) = tree_of(json!({
            "id": "a", "nodes": [{"id": "b", "nodes": [{"id": "c"}]}]
        }));
        let b = tree.find(root, "b").unwrap();
        let c = tree.find(root, "c").unwrap();

        assert!(!tree.move_to(b, c, None));
        assert!(!tree.move_to(b, b, None));
        assert_eq!(tree.parent(c), Some(b));
    }

    #[test]
    fn given_removal_first_when_nothing_matches_then_noop() {
        let (mut tree, root) = tree_of(json!({"id": "a", "nodes": [{"id": "b"}]}));
        let removed = tree.remove_where(root, &Query::new().eq("id", "zz"), Removal::First);
        assert_eq!(removed, 0);
        assert_eq!(tree.len(), 2);
    }
}
