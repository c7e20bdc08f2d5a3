use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("a chained repository needs at least one tier")]
    EmptyChain,

    #[error("tier {tier} uses serializer {found:?}, primary tier uses {primary:?}")]
    MixedSerializers {
        primary: &'static str,
        tier: usize,
        found: &'static str,
    },

    #[error("store error: {0}")]
    Store(#[from] cairn_store::StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] cairn_codec::CodecError),

    #[error("graph error: {0}")]
    Graph(#[from] cairn_graph::GraphError),
}

pub type RepoResult<T> = Result<T, RepoError>;
