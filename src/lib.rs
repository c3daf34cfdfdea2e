//! Ordered n-ary tree of attribute records.
//!
//! Nodes live in a [`domain::TreeArena`] and are addressed by generational
//! [`domain::NodeId`] handles. A node's parent is derived from the child set
//! that contains it, never stored on the node.
//!
//! ```
//! use serde_json::json;
//! use treemodel::domain::{NodeSpec, Query, TreeArena};
//!
//! let mut tree = TreeArena::new();
//! let root = tree.create(
//!     NodeSpec::from_value(json!({
//!         "id": "a",
//!         "nodes": [{"id": "b", "type": "x"}, {"id": "c"}]
//!     }))
//!     .unwrap(),
//! );
//!
//! let b = tree.find(root, "b").unwrap();
//! assert_eq!(tree.parent(b), Some(root));
//! assert_eq!(tree.where_all(root, &Query::new().eq("type", "x")).len(), 1);
//!
//! tree.insert_after(b, [NodeSpec::default().attr("id", "w")]);
//! assert_eq!(tree.index(tree.find(root, "c").unwrap()), Some(2));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{
    ChildSetId, Depth, NodeId, NodeSet, NodeSpec, Query, Removal, TreeArena, TreeNodeConvert,
};
