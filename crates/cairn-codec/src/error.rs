use thiserror::Error;

use cairn_tree::TreeError;
use cairn_types::TypeError;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Bytes decoded, but describe an entity that violates its invariants.
    #[error("invalid entity: {0}")]
    InvalidEntity(#[from] TreeError),

    #[error("invalid value: {0}")]
    InvalidValue(#[from] TypeError),
}

pub type CodecResult<T> = Result<T, CodecError>;
