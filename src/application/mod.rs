//! Application layer: loading trees from files with the configured settings
//!
//! This layer connects the domain model to files and configuration.

pub mod error;
pub mod error_ext;
pub mod loader;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use loader::{load_tree, parse_tree, LoadedTree, SourceFormat};
