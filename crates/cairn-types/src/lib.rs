//! Foundation types for Cairn.
//!
//! This crate provides the identity and reference types shared by every
//! other Cairn crate.
//!
//! # Key Types
//!
//! - [`ContentHash`] — SHA-1 digest used as both identity and sort key
//! - [`BlobId`], [`MapId`], [`ListId`], [`SetId`], [`CommitId`] — kind-tagged hashes
//! - [`NodeKind`] — the kind of entity a reference points at
//! - [`TreeRef`] — a `(kind, hash)` pointer
//! - [`TreeMapNode`] — a named [`TreeRef`], the entry type of a tree map
//! - [`Comparer`], [`EqualityComparer`] — standalone ordering values for each entity

pub mod comparer;
pub mod error;
pub mod hash;
pub mod ids;
pub mod kind;
pub mod node;
pub mod tree_ref;

pub use comparer::{
    hash_of, Comparer, ContentHashComparer, EqualityComparer, TreeMapNodeComparer,
    TreeMapNodeNameComparer, TreeRefComparer,
};
pub use error::{TypeError, TypeResult};
pub use hash::{ContentHash, HashFormat, HASH_LEN};
pub use ids::{BlobId, CommitId, ListId, MapId, SetId};
pub use kind::NodeKind;
pub use node::TreeMapNode;
pub use tree_ref::TreeRef;
