//! Domain-level errors (no external dependencies)
//!
//! Tree operations themselves never fail; these only cover malformed input
//! at the boundary where specs and queries are built from plain values.

use thiserror::Error;

/// Domain errors represent malformed tree or query input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node spec must be an object, got: {0}")]
    InvalidSpec(String),

    #[error("children under '{key}' must be an array or object, got: {found}")]
    InvalidChildren { key: String, found: String },

    #[error("query must be an object of attribute values, got: {0}")]
    InvalidQuery(String),

    #[error("invalid attribute filter '{0}': expected key=value")]
    InvalidFilter(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
