use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use cairn_codec::{BufferSession, ObjectSerializer};
use cairn_graph::{Audit, Commit, CommitRef};
use cairn_store::CasOutcome;
use cairn_tree::{TreeList, TreeMap, TreeSet};
use cairn_types::{BlobId, CommitId, ContentHash, ListId, MapId, SetId};
use tokio_util::sync::CancellationToken;

use crate::error::{RepoError, RepoResult};

/// Fail fast if `cancel` has fired.
pub(crate) fn ensure_live(cancel: &CancellationToken) -> RepoResult<()> {
    if cancel.is_cancelled() {
        return Err(RepoError::Cancelled);
    }
    Ok(())
}

/// Hash the serialized bytes and release the buffer back to its pool.
fn seal(session: BufferSession) -> (ContentHash, Bytes) {
    (ContentHash::hash(&session), Bytes::copy_from_slice(&session))
}

/// Typed access to a content-addressed repository.
///
/// Implementors supply the raw byte and ref operations plus the serializer;
/// every typed operation is derived from those. Reads that miss return
/// `Ok(None)`. Object writes are create-if-absent, so rewriting identical
/// content is a no-op. Ref writes are compare-and-swap and report a
/// [`CasOutcome`] rather than resolving conflicts.
///
/// Every operation takes a [`CancellationToken`]. A cancelled token aborts
/// the operation before its next store call; a store write that already
/// started is not rolled back.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// The codec used for every typed operation.
    fn serializer(&self) -> &dyn ObjectSerializer;

    async fn read_object(
        &self,
        hash: &ContentHash,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<Bytes>>;

    /// One logical read; the result holds only the hashes that resolved.
    async fn read_object_batch(
        &self,
        hashes: &[ContentHash],
        cancel: &CancellationToken,
    ) -> RepoResult<HashMap<ContentHash, Bytes>>;

    async fn write_object(
        &self,
        hash: &ContentHash,
        data: Bytes,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> RepoResult<()>;

    async fn read_commit_ref(
        &self,
        repo: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<CommitRef>>;

    /// Point `repo/name` at `new` if it currently holds `previous`.
    async fn write_commit_ref(
        &self,
        previous: Option<CommitId>,
        repo: &str,
        name: &str,
        new: CommitId,
        cancel: &CancellationToken,
    ) -> RepoResult<CasOutcome>;

    // ---- Blobs ----

    async fn read_blob(&self, id: BlobId, cancel: &CancellationToken) -> RepoResult<Option<Bytes>> {
        self.read_object(&id.hash(), cancel).await
    }

    async fn write_blob(&self, data: Bytes, cancel: &CancellationToken) -> RepoResult<BlobId> {
        let hash = ContentHash::hash(&data);
        self.write_object(&hash, data, false, cancel).await?;
        Ok(BlobId::new(hash))
    }

    // ---- Tree maps ----

    async fn read_tree_map(&self, id: MapId, cancel: &CancellationToken) -> RepoResult<Option<TreeMap>> {
        match self.read_object(&id.hash(), cancel).await? {
            Some(bytes) => Ok(Some(self.serializer().deserialize_tree_map(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn read_tree_map_batch(
        &self,
        ids: &[MapId],
        cancel: &CancellationToken,
    ) -> RepoResult<HashMap<MapId, TreeMap>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let hashes: Vec<ContentHash> = ids.iter().map(MapId::hash).collect();
        let found = self.read_object_batch(&hashes, cancel).await?;
        let codec = self.serializer();
        let mut maps = HashMap::with_capacity(found.len());
        for (hash, bytes) in &found {
            maps.insert(MapId::new(*hash), codec.deserialize_tree_map(bytes)?);
        }
        Ok(maps)
    }

    /// The root map of commit `id`. `None` if the commit is missing or has no tree.
    async fn read_tree_map_by_commit(
        &self,
        id: CommitId,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<TreeMap>> {
        let Some(commit) = self.read_commit(id, cancel).await? else {
            return Ok(None);
        };
        match commit.tree_id {
            Some(tree_id) => self.read_tree_map(tree_id, cancel).await,
            None => Ok(None),
        }
    }

    /// The root map of the commit that `repo/name` points at.
    async fn read_tree_map_by_ref(
        &self,
        repo: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<TreeMap>> {
        match self.read_commit_ref(repo, name, cancel).await? {
            Some(commit_ref) => self.read_tree_map_by_commit(commit_ref.commit_id(), cancel).await,
            None => Ok(None),
        }
    }

    async fn write_tree_map(&self, map: &TreeMap, cancel: &CancellationToken) -> RepoResult<MapId> {
        let (hash, bytes) = seal(self.serializer().serialize_tree_map(map)?);
        self.write_object(&hash, bytes, false, cancel).await?;
        Ok(MapId::new(hash))
    }

    /// Write `tree`, then a commit of it on top of `parents`.
    async fn write_tree_commit(
        &self,
        parents: Vec<CommitId>,
        tree: &TreeMap,
        author: Audit,
        committer: Audit,
        message: &str,
        cancel: &CancellationToken,
    ) -> RepoResult<CommitId> {
        let tree_id = self.write_tree_map(tree, cancel).await?;
        let commit = Commit::new(parents, Some(tree_id), author, committer, message);
        self.write_commit(&commit, cancel).await
    }

    // ---- Tree lists and sets ----

    async fn read_tree_list(&self, id: ListId, cancel: &CancellationToken) -> RepoResult<Option<TreeList>> {
        match self.read_object(&id.hash(), cancel).await? {
            Some(bytes) => Ok(Some(self.serializer().deserialize_tree_list(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_tree_list(&self, list: &TreeList, cancel: &CancellationToken) -> RepoResult<ListId> {
        let (hash, bytes) = seal(self.serializer().serialize_tree_list(list)?);
        self.write_object(&hash, bytes, false, cancel).await?;
        Ok(ListId::new(hash))
    }

    async fn read_tree_set(&self, id: SetId, cancel: &CancellationToken) -> RepoResult<Option<TreeSet>> {
        match self.read_object(&id.hash(), cancel).await? {
            Some(bytes) => Ok(Some(self.serializer().deserialize_tree_set(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_tree_set(&self, set: &TreeSet, cancel: &CancellationToken) -> RepoResult<SetId> {
        let (hash, bytes) = seal(self.serializer().serialize_tree_set(set)?);
        self.write_object(&hash, bytes, false, cancel).await?;
        Ok(SetId::new(hash))
    }

    // ---- Commits ----

    async fn read_commit(&self, id: CommitId, cancel: &CancellationToken) -> RepoResult<Option<Commit>> {
        match self.read_object(&id.hash(), cancel).await? {
            Some(bytes) => Ok(Some(self.serializer().deserialize_commit(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn read_commit_batch(
        &self,
        ids: &[CommitId],
        cancel: &CancellationToken,
    ) -> RepoResult<HashMap<CommitId, Commit>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let hashes: Vec<ContentHash> = ids.iter().map(CommitId::hash).collect();
        let found = self.read_object_batch(&hashes, cancel).await?;
        let codec = self.serializer();
        let mut commits = HashMap::with_capacity(found.len());
        for (hash, bytes) in &found {
            commits.insert(CommitId::new(*hash), codec.deserialize_commit(bytes)?);
        }
        Ok(commits)
    }

    async fn write_commit(&self, commit: &Commit, cancel: &CancellationToken) -> RepoResult<CommitId> {
        let (hash, bytes) = seal(self.serializer().serialize_commit(commit)?);
        self.write_object(&hash, bytes, false, cancel).await?;
        Ok(CommitId::new(hash))
    }
}
