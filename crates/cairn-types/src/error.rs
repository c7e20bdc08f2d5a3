use thiserror::Error;

use crate::kind::NodeKind;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Hash text or a hash format specifier could not be understood.
    #[error("invalid hash format {input:?}: {reason}")]
    Format { input: String, reason: String },

    /// A required argument was missing, empty or otherwise unusable.
    #[error("invalid argument `{name}`: {reason}")]
    Argument { name: &'static str, reason: String },

    /// A raw kind tag that does not name any [`NodeKind`].
    #[error("invalid node kind tag: {0}")]
    InvalidKind(u8),

    /// A reference was narrowed to an identifier of the wrong kind.
    #[error("{}must be a {expected}, found {actual}", node_prefix(.name))]
    InvalidOperation {
        expected: NodeKind,
        actual: NodeKind,
        name: Option<String>,
    },

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn node_prefix(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("the node {name} "),
        None => "the node ".to_string(),
    }
}

impl TypeError {
    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
