use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cairn_codec::ObjectSerializer;
use cairn_graph::CommitRef;
use cairn_store::{CasOutcome, ObjectStore};
use cairn_types::{CommitId, ContentHash};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{RepoError, RepoResult};
use crate::traits::{ensure_live, ContentRepository};

/// A repository over one backing store and one serializer.
///
/// Both are injected at construction; cloning shares them.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn ObjectStore>,
    serializer: Arc<dyn ObjectSerializer>,
}

impl Repository {
    pub fn new(store: Arc<dyn ObjectStore>, serializer: Arc<dyn ObjectSerializer>) -> Self {
        Self { store, serializer }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("serializer", &self.serializer.name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentRepository for Repository {
    fn serializer(&self) -> &dyn ObjectSerializer {
        self.serializer.as_ref()
    }

    async fn read_object(
        &self,
        hash: &ContentHash,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<Bytes>> {
        ensure_live(cancel)?;
        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RepoError::Cancelled),
            found = self.store.read_object(hash) => found?,
        };
        trace!(%hash, hit = found.is_some(), "read object");
        Ok(found)
    }

    async fn read_object_batch(
        &self,
        hashes: &[ContentHash],
        cancel: &CancellationToken,
    ) -> RepoResult<HashMap<ContentHash, Bytes>> {
        ensure_live(cancel)?;
        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RepoError::Cancelled),
            found = self.store.read_object_batch(hashes) => found?,
        };
        debug!(requested = hashes.len(), found = found.len(), "batch read");
        Ok(found)
    }

    async fn write_object(
        &self,
        hash: &ContentHash,
        data: Bytes,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> RepoResult<()> {
        ensure_live(cancel)?;
        let len = data.len();
        self.store.write_object(hash, data, overwrite).await?;
        debug!(%hash, len, codec = self.serializer.name(), "wrote object");
        Ok(())
    }

    async fn read_commit_ref(
        &self,
        repo: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<CommitRef>> {
        ensure_live(cancel)?;
        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RepoError::Cancelled),
            found = self.store.read_ref(repo, name) => found?,
        };
        match found {
            Some(commit_id) => Ok(Some(CommitRef::new(name, commit_id)?)),
            None => Ok(None),
        }
    }

    async fn write_commit_ref(
        &self,
        previous: Option<CommitId>,
        repo: &str,
        name: &str,
        new: CommitId,
        cancel: &CancellationToken,
    ) -> RepoResult<CasOutcome> {
        ensure_live(cancel)?;
        let outcome = self.store.write_ref(previous, repo, name, new).await?;
        debug!(repo, name, ?previous, %new, applied = outcome.is_applied(), "ref write");
        Ok(outcome)
    }
}
