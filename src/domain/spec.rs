//! Node specifications: the plain description a node is materialized from.

use serde_json::{Map, Value};

use crate::domain::attrs::Attrs;
use crate::domain::error::{DomainError, DomainResult};

/// Key holding child specs unless configured otherwise.
pub const DEFAULT_CHILDREN_KEY: &str = "nodes";

/// Attributes plus child specs, materialized recursively into a subtree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSpec {
    pub attrs: Attrs,
    pub nodes: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(attrs: Attrs) -> Self {
        Self {
            attrs,
            nodes: Vec::new(),
        }
    }

    /// Set one attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Append one child spec.
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.nodes.push(child);
        self
    }

    /// Parse a spec using the default children key.
    pub fn from_value(value: Value) -> DomainResult<Self> {
        Self::from_value_with_key(value, DEFAULT_CHILDREN_KEY)
    }

    /// Parse a spec whose children live under `children_key`.
    ///
    /// The children key is consumed; it does not become an attribute.
    pub fn from_value_with_key(value: Value, children_key: &str) -> DomainResult<Self> {
        let mut attrs = match value {
            Value::Object(map) => map,
            other => return Err(DomainError::InvalidSpec(other.to_string())),
        };
        let nodes = match attrs.remove(children_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(children) => Self::many_from_value(children, children_key)?,
        };
        Ok(Self { attrs, nodes })
    }

    /// Parse either a single spec object or an array of them.
    pub fn many_from_value(value: Value, children_key: &str) -> DomainResult<Vec<Self>> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Self::from_value_with_key(item, children_key))
                .collect(),
            obj @ Value::Object(_) => Ok(vec![Self::from_value_with_key(obj, children_key)?]),
            other => Err(DomainError::InvalidChildren {
                key: children_key.to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// Plain value form, children nested under `children_key` when present.
    pub fn to_value(&self, children_key: &str) -> Value {
        let mut map: Map<String, Value> = self.attrs.clone();
        if !self.nodes.is_empty() {
            let children = self.nodes.iter().map(|n| n.to_value(children_key)).collect();
            map.insert(children_key.to_string(), Value::Array(children));
        }
        Value::Object(map)
    }

    /// Number of specs in this subtree, self included.
    pub fn count(&self) -> usize {
        1 + self.nodes.iter().map(NodeSpec::count).sum::<usize>()
    }
}

impl TryFrom<Value> for NodeSpec {
    type Error = DomainError;

    fn try_from(value: Value) -> DomainResult<Self> {
        Self::from_value(value)
    }
}
