use serde::{Deserialize, Serialize};

use cairn_types::{CommitId, MapId};

use crate::audit::Audit;

/// An immutable snapshot in the commit graph.
///
/// A commit's identity is not stored here: it is the hash of the commit's
/// serialized bytes, computed when the commit is written. Zero parents make
/// a root commit, one a normal commit, several a merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commit {
    pub parents: Vec<CommitId>,
    pub tree_id: Option<MapId>,
    pub author: Audit,
    pub committer: Audit,
    pub message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<CommitId>,
        tree_id: Option<MapId>,
        author: Audit,
        committer: Audit,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parents,
            tree_id,
            author,
            committer,
            message: message.into(),
        }
    }

    /// A root commit of `tree_id` with no parents.
    pub fn root(tree_id: MapId, author: Audit, message: impl Into<String>) -> Self {
        Self::new(Vec::new(), Some(tree_id), author.clone(), author, message)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// `true` for the canonical empty commit, [`Commit::default`].
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
            && self.tree_id.is_none()
            && self.author.is_empty()
            && self.committer.is_empty()
            && self.message.is_empty()
    }
}
