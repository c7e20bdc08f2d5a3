use cairn_types::ContentHash;

/// Errors from backing store operations.
///
/// A missing object or ref is not an error; reads return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored object bytes could not be decoded.
    #[error("corrupt object {hash}: {reason}")]
    CorruptObject { hash: ContentHash, reason: String },

    /// A stored ref does not hold a valid commit id.
    #[error("corrupt ref {repo}/{name}: {reason}")]
    CorruptRef {
        repo: String,
        name: String,
        reason: String,
    },

    /// Repository or ref name rejected by validation.
    #[error("invalid ref name {name:?}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Store configuration is unusable.
    #[error("invalid store config: {0}")]
    Config(String),

    /// A background read task failed to complete.
    #[error("store task failed: {0}")]
    Task(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
