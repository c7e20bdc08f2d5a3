use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cairn_codec::ObjectSerializer;
use cairn_graph::CommitRef;
use cairn_store::CasOutcome;
use cairn_types::{CommitId, ContentHash};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{RepoError, RepoResult};
use crate::traits::{ensure_live, ContentRepository};

/// An ordered list of repositories read as one.
///
/// Reads probe the tiers in order and the first hit wins. A hit in a later
/// tier is not copied into earlier ones. Object and ref writes go to the
/// primary (first) tier only.
///
/// Every tier must use the same wire format, so bytes found in any tier
/// decode with the primary tier's serializer.
pub struct ChainedRepository {
    tiers: Vec<Arc<dyn ContentRepository>>,
}

impl ChainedRepository {
    pub fn new(tiers: Vec<Arc<dyn ContentRepository>>) -> RepoResult<Self> {
        let Some(primary) = tiers.first() else {
            return Err(RepoError::EmptyChain);
        };
        let codec = primary.serializer().name();
        if let Some((tier, other)) = tiers
            .iter()
            .enumerate()
            .find(|(_, t)| t.serializer().name() != codec)
        {
            return Err(RepoError::MixedSerializers {
                primary: codec,
                tier,
                found: other.serializer().name(),
            });
        }
        Ok(Self { tiers })
    }

    /// The tier that receives writes.
    pub fn primary(&self) -> &Arc<dyn ContentRepository> {
        &self.tiers[0]
    }

    pub fn tiers(&self) -> &[Arc<dyn ContentRepository>] {
        &self.tiers
    }
}

impl fmt::Debug for ChainedRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedRepository")
            .field("tiers", &self.tiers.len())
            .field("serializer", &self.serializer().name())
            .finish()
    }
}

#[async_trait]
impl ContentRepository for ChainedRepository {
    fn serializer(&self) -> &dyn ObjectSerializer {
        self.primary().serializer()
    }

    async fn read_object(
        &self,
        hash: &ContentHash,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<Bytes>> {
        for (tier, repo) in self.tiers.iter().enumerate() {
            ensure_live(cancel)?;
            if let Some(bytes) = repo.read_object(hash, cancel).await? {
                trace!(%hash, tier, "chain hit");
                return Ok(Some(bytes));
            }
        }
        trace!(%hash, "chain miss");
        Ok(None)
    }

    async fn read_object_batch(
        &self,
        hashes: &[ContentHash],
        cancel: &CancellationToken,
    ) -> RepoResult<HashMap<ContentHash, Bytes>> {
        let mut found = HashMap::with_capacity(hashes.len());
        let mut pending: Vec<ContentHash> = hashes.to_vec();
        for (tier, repo) in self.tiers.iter().enumerate() {
            if pending.is_empty() {
                break;
            }
            ensure_live(cancel)?;
            let hits = repo.read_object_batch(&pending, cancel).await?;
            debug!(tier, requested = pending.len(), found = hits.len(), "chain batch tier");
            pending.retain(|hash| !hits.contains_key(hash));
            found.extend(hits);
        }
        Ok(found)
    }

    async fn write_object(
        &self,
        hash: &ContentHash,
        data: Bytes,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> RepoResult<()> {
        self.primary().write_object(hash, data, overwrite, cancel).await
    }

    async fn read_commit_ref(
        &self,
        repo: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<CommitRef>> {
        for (tier, r) in self.tiers.iter().enumerate() {
            ensure_live(cancel)?;
            if let Some(commit_ref) = r.read_commit_ref(repo, name, cancel).await? {
                trace!(repo, name, tier, "chain ref hit");
                return Ok(Some(commit_ref));
            }
        }
        Ok(None)
    }

    async fn write_commit_ref(
        &self,
        previous: Option<CommitId>,
        repo: &str,
        name: &str,
        new: CommitId,
        cancel: &CancellationToken,
    ) -> RepoResult<CasOutcome> {
        self.primary()
            .write_commit_ref(previous, repo, name, new, cancel)
            .await
    }
}
