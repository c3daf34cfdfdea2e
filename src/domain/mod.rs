//! Domain layer: the tree model and its query/mutation engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod attrs;
pub mod child_set;
pub mod display;
pub mod error;
pub mod node;
pub mod query;
pub mod spec;

pub use arena::{ChildSetId, NodeId, TreeArena, TreeIterator, TreeNode, DEFAULT_ID_FIELD};
pub use attrs::{label_of, parse_filter, Attrs, Query};
pub use child_set::{ChildSet, Depth};
pub use display::TreeNodeConvert;
pub use error::{DomainError, DomainResult};
pub use node::Removal;
pub use query::NodeSet;
pub use spec::{NodeSpec, DEFAULT_CHILDREN_KEY};
