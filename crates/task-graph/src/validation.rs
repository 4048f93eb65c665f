//! Validation utilities for task graphs.
//!
//! Focus views and levels tolerate cycles, so nothing here is required before
//! a query. Callers use it to surface structural problems to users.

use crate::{Edge, Error, NodeSet, has_cycles};

/// Result of graph validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph is valid (no cycles).
    pub is_valid: bool,
    /// List of validation errors, if any.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// Create a valid result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create an invalid result with errors.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Validate the structure formed by `nodes` and `edges`.
///
/// Checks for:
/// - Cycles among edges whose endpoints are both in the node set
#[must_use]
pub fn validate<N>(nodes: &N, edges: &[Edge]) -> ValidationResult
where
    N: NodeSet + ?Sized,
{
    let mut errors = Vec::new();

    if has_cycles(nodes, edges) {
        errors.push(Error::cycle_detected("Task dependency graph contains cycles"));
    }

    if errors.is_empty() {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(errors)
    }
}
