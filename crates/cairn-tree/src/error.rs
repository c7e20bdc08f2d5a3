//! Error types for tree collection operations.

use thiserror::Error;

use cairn_types::{TreeRef, TypeError};

/// Errors produced while building or indexing tree collections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Two nodes share a name but point at different content.
    #[error("duplicate node name {name:?}: {existing} conflicts with {conflicting}")]
    DuplicateName {
        name: String,
        existing: TreeRef,
        conflicting: TreeRef,
    },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for tree collection operations.
pub type TreeResult<T> = Result<T, TreeError>;
