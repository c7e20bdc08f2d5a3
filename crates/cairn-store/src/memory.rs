use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use cairn_types::{CommitId, ContentHash};
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};
use crate::names::{validate_ref_name, validate_repo_name};
use crate::traits::{CasOutcome, ObjectStore};

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

/// In-memory, HashMap-based store.
///
/// Intended for tests and embedding. Objects sit behind a `RwLock`; refs sit
/// behind a single `Mutex` so each compare-and-swap runs as one critical
/// section. Nothing survives a drop.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ContentHash, Bytes>>,
    refs: Mutex<HashMap<(String, String), CommitId>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.objects.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, hash: &ContentHash) -> StoreResult<bool> {
        Ok(self.objects.read().map_err(poisoned)?.contains_key(hash))
    }

    /// All refs of `repo`, sorted by name.
    pub fn refs_of(&self, repo: &str) -> StoreResult<Vec<(String, CommitId)>> {
        let refs = self.refs.lock().map_err(poisoned)?;
        let mut found: Vec<(String, CommitId)> = refs
            .iter()
            .filter(|((r, _), _)| r == repo)
            .map(|((_, name), id)| (name.clone(), *id))
            .collect();
        found.sort();
        Ok(found)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn read_object(&self, hash: &ContentHash) -> StoreResult<Option<Bytes>> {
        let objects = self.objects.read().map_err(poisoned)?;
        let found = objects.get(hash).cloned();
        trace!(%hash, hit = found.is_some(), "memory read");
        Ok(found)
    }

    async fn read_object_batch(
        &self,
        hashes: &[ContentHash],
    ) -> StoreResult<HashMap<ContentHash, Bytes>> {
        let objects = self.objects.read().map_err(poisoned)?;
        let found: HashMap<ContentHash, Bytes> = hashes
            .iter()
            .filter_map(|h| objects.get(h).map(|b| (*h, b.clone())))
            .collect();
        debug!(requested = hashes.len(), found = found.len(), "memory batch read");
        Ok(found)
    }

    async fn write_object(&self, hash: &ContentHash, data: Bytes, overwrite: bool) -> StoreResult<()> {
        let mut objects = self.objects.write().map_err(poisoned)?;
        trace!(%hash, len = data.len(), overwrite, "memory write");
        if overwrite {
            objects.insert(*hash, data);
        } else {
            objects.entry(*hash).or_insert(data);
        }
        Ok(())
    }

    async fn read_ref(&self, repo: &str, name: &str) -> StoreResult<Option<CommitId>> {
        validate_repo_name(repo)?;
        validate_ref_name(name)?;
        let refs = self.refs.lock().map_err(poisoned)?;
        Ok(refs.get(&(repo.to_string(), name.to_string())).copied())
    }

    async fn write_ref(
        &self,
        previous: Option<CommitId>,
        repo: &str,
        name: &str,
        new: CommitId,
    ) -> StoreResult<CasOutcome> {
        validate_repo_name(repo)?;
        validate_ref_name(name)?;
        let key = (repo.to_string(), name.to_string());
        let mut refs = self.refs.lock().map_err(poisoned)?;
        let actual = refs.get(&key).copied();
        if actual != previous {
            debug!(repo, name, ?previous, ?actual, "ref CAS conflict");
            return Ok(CasOutcome::Conflict {
                expected: previous,
                actual,
            });
        }
        refs.insert(key, new);
        debug!(repo, name, %new, "ref CAS applied");
        Ok(CasOutcome::Applied)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let objects = self.objects.read().map(|o| o.len()).ok();
        let refs = self.refs.lock().map(|r| r.len()).ok();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &objects)
            .field("ref_count", &refs)
            .finish()
    }
}
