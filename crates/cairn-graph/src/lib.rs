//! Commit graph entities for Cairn.
//!
//! Commits reference their parents and root tree by hash only; nothing in
//! this crate holds a live pointer to another entity.
//!
//! # Key Types
//!
//! - [`Commit`] — parents, optional root map, author, committer, message
//! - [`Audit`] — an actor name plus an offset-preserving timestamp
//! - [`CommitRef`] — a named pointer to a [`CommitId`](cairn_types::CommitId)

pub mod audit;
pub mod commit;
pub mod commit_ref;
pub mod error;

pub use audit::Audit;
pub use commit::Commit;
pub use commit_ref::CommitRef;
pub use error::{GraphError, GraphResult};
