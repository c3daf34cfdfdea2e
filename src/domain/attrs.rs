//! Attribute records and the typed query matched against them.

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};

/// Attribute payload of a node: field name to plain value.
pub type Attrs = Map<String, Value>;

/// Attribute query: every field must be present on a node with a structurally
/// equal value.
///
/// Equality is `serde_json::Value` equality, no coercion happens:
/// `1` does not match `"1"` or `1.0`, and a missing field never matches `null`.
/// The empty query matches every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    attrs: Attrs,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query on a single id field.
    pub fn by_id(id_field: &str, id: impl Into<Value>) -> Self {
        Self::new().eq(id_field, id)
    }

    /// Add a `key == value` condition.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Build a query from a JSON object.
    pub fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Object(attrs) => Ok(Self { attrs }),
            other => Err(DomainError::InvalidQuery(other.to_string())),
        }
    }

    /// Build a query from `key=value` filters.
    pub fn from_filters<I, S>(filters: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        filters.into_iter().try_fold(Self::new(), |query, filter| {
            let (key, value) = parse_filter(filter.as_ref())?;
            Ok(query.eq(key, value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attrs.iter()
    }

    pub fn matches(&self, attrs: &Attrs) -> bool {
        self.attrs
            .iter()
            .all(|(key, expected)| attrs.get(key) == Some(expected))
    }
}

impl From<Attrs> for Query {
    fn from(attrs: Attrs) -> Self {
        Self { attrs }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.attrs.clone()))
    }
}

/// Parse a `key=value` filter.
///
/// The value is read as JSON when it parses (`n=3`, `ok=true`, `tags=["a"]`),
/// otherwise it is taken as a plain string (`type=folder`).
pub fn parse_filter(filter: &str) -> DomainResult<(String, Value)> {
    let (key, raw) = filter
        .split_once('=')
        .ok_or_else(|| DomainError::InvalidFilter(filter.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(DomainError::InvalidFilter(filter.to_string()));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Display form of an attribute value: strings unquoted, everything else as JSON.
pub fn label_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
