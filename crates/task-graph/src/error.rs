//! Error types for task graph operations.

use thiserror::Error;

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the boundary of task graph operations.
///
/// The traversal itself never fails; these variants cover caller input that
/// must be rejected before a query runs, and structural findings reported by
/// [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A focus depth below zero was supplied.
    #[error("Focus depth must be zero or greater, got {depth}")]
    InvalidDepth {
        /// The rejected depth.
        depth: i64,
    },

    /// A dependency cycle was detected in the graph.
    #[error("Cycle detected in task graph: {message}")]
    CycleDetected {
        /// Human-readable description of the cycle.
        message: String,
    },
}

impl Error {
    /// Create an invalid depth error.
    #[must_use]
    pub const fn invalid_depth(depth: i64) -> Self {
        Self::InvalidDepth { depth }
    }

    /// Create a cycle error.
    #[must_use]
    pub fn cycle_detected(message: impl Into<String>) -> Self {
        Self::CycleDetected {
            message: message.into(),
        }
    }
}
