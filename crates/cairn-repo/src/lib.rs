//! Repository orchestration for Cairn.
//!
//! A [`Repository`] pairs a backing [`ObjectStore`](cairn_store::ObjectStore)
//! with an [`ObjectSerializer`](cairn_codec::ObjectSerializer) and exposes
//! typed reads and writes of maps, lists, sets, commits and refs. A
//! [`ChainedRepository`] reads through an ordered list of repositories.
//!
//! # Key Types
//!
//! - [`ContentRepository`] — the async repository contract
//! - [`Repository`] — one store plus one serializer
//! - [`ChainedRepository`] — first-hit-wins tiers, writes to the primary
//! - [`RepoError`] — cancellation, store, codec and chain errors

pub mod chained;
pub mod error;
pub mod repository;
pub mod traits;

pub use chained::ChainedRepository;
pub use error::{RepoError, RepoResult};
pub use repository::Repository;
pub use traits::ContentRepository;

pub use cairn_store::CasOutcome;
pub use tokio_util::sync::CancellationToken;
