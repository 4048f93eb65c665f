//! Error types for the graph view model.

use thiserror::Error;

/// Errors raised while loading tasks or building view inputs.
#[derive(Error, Debug)]
pub enum Error {
    /// The task document could not be parsed.
    #[error("Failed to parse task document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two task records share an identifier.
    #[error("Duplicate task id '{id}'")]
    DuplicateTask {
        /// The repeated identifier.
        id: String,
    },

    /// A hierarchy mode string was not recognised.
    #[error("Unknown hierarchy mode '{value}' (expected full, wp or act)")]
    InvalidHierarchyMode {
        /// The rejected value.
        value: String,
    },

    /// A graph query rejected its input.
    #[error(transparent)]
    Graph(#[from] orchay_task_graph::Error),
}

impl Error {
    /// Create a duplicate task error.
    #[must_use]
    pub fn duplicate_task(id: impl Into<String>) -> Self {
        Self::DuplicateTask { id: id.into() }
    }

    /// Create an unknown hierarchy mode error.
    #[must_use]
    pub fn invalid_hierarchy_mode(value: impl Into<String>) -> Self {
        Self::InvalidHierarchyMode {
            value: value.into(),
        }
    }
}

/// Result type for graph view operations.
pub type Result<T> = std::result::Result<T, Error>;
