use thiserror::Error;

/// Errors produced when building graph entities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A required name was empty or whitespace.
    #[error("{field} must not be empty or whitespace")]
    BlankName { field: &'static str },
}

pub type GraphResult<T> = Result<T, GraphError>;
