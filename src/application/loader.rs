//! Load a tree from a JSON or TOML document.
//!
//! The document is one node spec: attributes at the top level, children under
//! the configured children key, recursively.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{NodeId, NodeSpec, TreeArena};

/// Text format of a tree document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Toml,
}

impl SourceFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// A parsed tree together with the handle of its root.
#[derive(Debug)]
pub struct LoadedTree {
    pub tree: TreeArena,
    pub root: NodeId,
}

impl LoadedTree {
    /// Look up a node by id anywhere in the tree.
    pub fn require(&self, id: &str) -> ApplicationResult<NodeId> {
        let id = parse_id(id);
        self.tree.find(self.root, id.clone()).ok_or_else(|| {
            ApplicationError::NodeNotFound(format!("{}={}", self.tree.id_field(), id))
        })
    }
}

/// Ids given on the command line are read as JSON when they parse (`7`),
/// otherwise as strings (`docs`).
fn parse_id(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Read and parse the tree document at `path`.
#[instrument(level = "debug", skip(settings))]
pub fn load_tree(path: &Path, settings: &Settings) -> ApplicationResult<LoadedTree> {
    let format = SourceFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).with_path_context("read tree", path)?;
    parse_tree(&content, format, settings, path)
}

/// Parse a tree document; `origin` is only used in error messages.
#[instrument(level = "debug", skip(content, settings))]
pub fn parse_tree(
    content: &str,
    format: SourceFormat,
    settings: &Settings,
    origin: &Path,
) -> ApplicationResult<LoadedTree> {
    let value: Value = match format {
        SourceFormat::Json => serde_json::from_str(content).map_err(|e| parse_err(origin, e))?,
        SourceFormat::Toml => toml::from_str(content).map_err(|e| parse_err(origin, e))?,
    };

    let spec = NodeSpec::from_value_with_key(value, &settings.children_key)?;
    let count = spec.count();

    let mut tree = TreeArena::with_id_field(settings.id_field.clone());
    let root = tree.create(spec);
    debug!(nodes = count, %root, "loaded tree");

    Ok(LoadedTree { tree, root })
}

fn parse_err(origin: &Path, e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Parse {
        path: PathBuf::from(origin),
        message: e.to_string(),
    }
}
