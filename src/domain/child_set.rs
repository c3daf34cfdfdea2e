//! Ordered sibling sets and the structural primitives that keep membership and
//! containing-set pointers in step.

use tracing::{debug, instrument};

use crate::domain::arena::{ChildSetId, NodeId, TreeArena};
use crate::domain::attrs::Query;
use crate::domain::query::NodeSet;
use crate::domain::spec::NodeSpec;

/// Ordered children of one node, or a root context when ownerless.
#[derive(Debug, Clone, Default)]
pub struct ChildSet {
    /// Node owning this set, None for a root context
    pub(crate) owner: Option<NodeId>,
    /// Members in sibling order
    pub(crate) members: Vec<NodeId>,
}

impl ChildSet {
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn at(&self, position: usize) -> Option<NodeId> {
        self.members.get(position).copied()
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.members.iter().position(|&member| member == node)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }
}

/// How far [`TreeArena::set_where`] descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// Direct members only
    #[default]
    Shallow,
    /// Each member's whole subtree, member included
    Deep,
}

impl TreeArena {
    /// Ownerless set holding the materialized `specs`; its members are roots.
    #[instrument(level = "debug", skip(self, specs))]
    pub fn create_set<I>(&mut self, specs: I) -> ChildSetId
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        let set = ChildSetId(self.sets.insert(ChildSet::default()));
        let added = self.insert_specs(set, None, specs);
        debug!(%set, members = added.len(), "created root set");
        set
    }

    /// Append materialized `specs` to `set`.
    #[instrument(level = "debug", skip(self, specs))]
    pub fn add_to_set<I>(&mut self, set: ChildSetId, specs: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        self.insert_specs(set, None, specs)
    }

    pub fn set_owner(&self, set: ChildSetId) -> Option<NodeId> {
        self.get_set(set)?.owner()
    }

    /// Members of `set`; empty for a stale handle.
    pub fn set_members(&self, set: ChildSetId) -> &[NodeId] {
        self.get_set(set).map(ChildSet::members).unwrap_or(&[])
    }

    pub fn set_len(&self, set: ChildSetId) -> usize {
        self.set_members(set).len()
    }

    pub fn set_at(&self, set: ChildSetId, position: usize) -> Option<NodeId> {
        self.get_set(set)?.at(position)
    }

    pub fn set_index_of(&self, set: ChildSetId, node: NodeId) -> Option<usize> {
        self.get_set(set)?.index_of(node)
    }

    /// All members matching `query`, or every match in the members' subtrees
    /// with [`Depth::Deep`]. Never short-circuits.
    #[instrument(level = "trace", skip(self))]
    pub fn set_where(&self, set: ChildSetId, query: &Query, depth: Depth) -> NodeSet {
        let members = self.set_members(set);
        match depth {
            Depth::Shallow => members
                .iter()
                .copied()
                .filter(|&member| self.matches(member, query))
                .collect(),
            Depth::Deep => members
                .iter()
                .flat_map(|&member| self.where_all(member, query))
                .collect(),
        }
    }

    /// First direct member matching `query`.
    pub fn set_find_where(&self, set: ChildSetId, query: &Query) -> Option<NodeId> {
        self.set_members(set)
            .iter()
            .copied()
            .find(|&member| self.matches(member, query))
    }

    /// Materialize `specs` and insert them into `set` starting at `at`
    /// (appending when None), keeping spec order.
    pub(crate) fn insert_specs<I>(
        &mut self,
        set: ChildSetId,
        at: Option<usize>,
        specs: I,
    ) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        if !self.sets.contains(set.0) {
            debug!(%set, "stale child set, nothing inserted");
            return Vec::new();
        }
        let mut position = at;
        let mut added = Vec::new();
        for spec in specs {
            let node = self.materialize(spec);
            self.attach(set, position, node);
            if let Some(p) = position.as_mut() {
                *p += 1;
            }
            added.push(node);
        }
        added
    }

    /// Put a detached node into `set` at `at` (clamped) or at the end.
    pub(crate) fn attach(&mut self, set: ChildSetId, at: Option<usize>, node: NodeId) {
        let members = &mut self.sets[set.0].members;
        let position = at.map_or(members.len(), |p| p.min(members.len()));
        members.insert(position, node);
        self.nodes[node.0].collection = Some(set);
    }

    /// Take `node` out of its containing set, returning the set and the
    /// position it held. None when the node is not contained anywhere.
    pub(crate) fn detach(&mut self, node: NodeId) -> Option<(ChildSetId, usize)> {
        let set = self.nodes.get(node.0)?.collection?;
        let members = &mut self.sets.get_mut(set.0)?.members;
        let position = members.iter().position(|&member| member == node)?;
        members.remove(position);
        self.nodes[node.0].collection = None;
        Some((set, position))
    }
}
