//! Text rendering of subtrees via termtree.

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::attrs::label_of;

pub trait TreeNodeConvert {
    /// Render the subtree rooted at `node`, labelling each node with
    /// `label_field` (falling back to the handle when the field is missing).
    fn to_tree_string(&self, node: NodeId, label_field: &str) -> Tree<String>;
}

impl TreeNodeConvert for TreeArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, node: NodeId, label_field: &str) -> Tree<String> {
        if !self.contains(node) {
            return Tree::new("Empty tree".to_string());
        }

        fn label(arena: &TreeArena, node: NodeId, label_field: &str) -> String {
            arena
                .attr(node, label_field)
                .map(label_of)
                .unwrap_or_else(|| node.to_string())
        }

        fn build_tree(arena: &TreeArena, node: NodeId, label_field: &str) -> Tree<String> {
            let leaves: Vec<_> = arena
                .children(node)
                .iter()
                .map(|&child| build_tree(arena, child, label_field))
                .collect();
            Tree::new(label(arena, node, label_field)).with_leaves(leaves)
        }

        build_tree(self, node, label_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spec::NodeSpec;
    use serde_json::json;

    #[test]
    fn given_tree_when_rendering_then_labels_follow_structure() {
        let mut tree = TreeArena::new();
        let root = tree.create(
            NodeSpec::from_value(json!({
                "id": "root",
                "nodes": [{"id": "child1", "nodes": [{"id": "grandchild1"}]}, {"id": 2}]
            }))
            .unwrap(),
        );

        let rendered = tree.to_tree_string(root, "id").to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "root");
        assert!(lines[1].ends_with("child1"));
        assert!(lines[2].ends_with("grandchild1"));
        assert!(lines[3].ends_with('2'));
    }
}
