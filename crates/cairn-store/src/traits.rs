use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use cairn_types::{CommitId, ContentHash};

use crate::error::StoreResult;

/// Result of a compare-and-swap ref write.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CasOutcome {
    /// The stored value matched `expected` and now holds the new id.
    Applied,
    /// The stored value differed from `expected`; nothing was written.
    Conflict {
        expected: Option<CommitId>,
        actual: Option<CommitId>,
    },
}

impl CasOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_conflict(&self) -> bool {
        !self.is_applied()
    }
}

/// Content-addressed byte store plus named commit refs.
///
/// The store never interprets object bytes; hashing and encoding belong to
/// the layer above. Implementations must satisfy these invariants:
/// - Objects are immutable once written. Writing existing content with
///   `overwrite == false` is a successful no-op.
/// - A miss is `Ok(None)`, never an error.
/// - `write_ref` is atomic per `(repo, name)`: concurrent writers race only
///   on the comparison against the stored value.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the bytes stored under `hash`.
    async fn read_object(&self, hash: &ContentHash) -> StoreResult<Option<Bytes>>;

    /// Read many objects. The result holds only the hashes that resolved.
    ///
    /// Default implementation reads one at a time. Backends may fan out.
    async fn read_object_batch(
        &self,
        hashes: &[ContentHash],
    ) -> StoreResult<HashMap<ContentHash, Bytes>> {
        let mut found = HashMap::with_capacity(hashes.len());
        for hash in hashes {
            if found.contains_key(hash) {
                continue;
            }
            if let Some(bytes) = self.read_object(hash).await? {
                found.insert(*hash, bytes);
            }
        }
        Ok(found)
    }

    /// Store `data` under `hash`.
    async fn write_object(&self, hash: &ContentHash, data: Bytes, overwrite: bool) -> StoreResult<()>;

    /// Current commit id of ref `name` in repository `repo`.
    async fn read_ref(&self, repo: &str, name: &str) -> StoreResult<Option<CommitId>>;

    /// Point `name` at `new` if it currently holds `previous`.
    ///
    /// `previous == None` expects the ref to be absent (creation).
    async fn write_ref(
        &self,
        previous: Option<CommitId>,
        repo: &str,
        name: &str,
        new: CommitId,
    ) -> StoreResult<CasOutcome>;
}
