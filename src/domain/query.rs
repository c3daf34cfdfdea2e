//! Query results.

use itertools::Itertools;

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::attrs::{Attrs, Query};

/// Ordered, deduplicated set of matched nodes.
///
/// Owns no nodes; handles may go stale if the tree is mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    ids: Vec<NodeId>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow by applying `query` to each member's own subtree (member
    /// included) and taking the deduplicated union.
    pub fn where_all(&self, tree: &TreeArena, query: &Query) -> NodeSet {
        self.ids
            .iter()
            .flat_map(|&id| tree.where_all(id, query))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.ids.contains(&node)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    /// Attribute snapshots of the members still alive in `tree`.
    pub fn snapshots(&self, tree: &TreeArena) -> Vec<Attrs> {
        self.ids.iter().filter_map(|&id| tree.snapshot(id)).collect()
    }
}

impl FromIterator<NodeId> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().unique().collect(),
        }
    }
}

impl IntoIterator for NodeSet {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

impl From<NodeSet> for Vec<NodeId> {
    fn from(set: NodeSet) -> Self {
        set.ids
    }
}
