//! File-backed store.
//!
//! Layout under the configured root:
//!
//! ```text
//! objects/<first 2 hex digits>/<remaining 38 hex digits>
//! refs/<repo>/<ref name, '/' separated>
//! ```
//!
//! Object files begin with a one-byte frame tag (raw or zstd) so a store can
//! change its compression setting without rewriting existing objects. Ref
//! files hold the commit id as 40 hex digits. Every file is written to a
//! temporary sibling and renamed into place.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cairn_types::{CommitId, ContentHash};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::config::DiskStoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::names::{validate_ref_name, validate_repo_name};
use crate::traits::{CasOutcome, ObjectStore};

const OBJECTS_DIR: &str = "objects";
const REFS_DIR: &str = "refs";

const FRAME_RAW: u8 = 0;
const FRAME_ZSTD: u8 = 1;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A store rooted in a local directory.
///
/// Ref compare-and-swap is serialized by an async mutex, so it is atomic
/// among users of one `DiskObjectStore` value. Separate processes sharing a
/// root are not coordinated.
#[derive(Debug)]
pub struct DiskObjectStore {
    config: DiskStoreConfig,
    ref_lock: Mutex<()>,
    readers: Arc<Semaphore>,
}

impl DiskObjectStore {
    /// Open (creating if needed) the store described by `config`.
    pub async fn open(config: DiskStoreConfig) -> StoreResult<Self> {
        config.validate()?;
        tokio::fs::create_dir_all(config.root.join(OBJECTS_DIR)).await?;
        tokio::fs::create_dir_all(config.root.join(REFS_DIR)).await?;
        debug!(
            root = %config.root.display(),
            compression = ?config.compression_level,
            "opened disk store"
        );
        Ok(Self {
            readers: Arc::new(Semaphore::new(config.max_concurrency)),
            ref_lock: Mutex::new(()),
            config,
        })
    }

    pub fn config(&self) -> &DiskStoreConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Where the object `hash` lives, whether or not it exists yet.
    pub fn object_path(&self, hash: &ContentHash) -> PathBuf {
        let hex = hash.to_hex();
        let (shard, rest) = hex.split_at(2);
        self.config.root.join(OBJECTS_DIR).join(shard).join(rest)
    }

    fn ref_path(&self, repo: &str, name: &str) -> PathBuf {
        let mut path = self.config.root.join(REFS_DIR).join(repo);
        path.extend(name.split('/'));
        path
    }

    fn frame(&self, data: &[u8]) -> StoreResult<Vec<u8>> {
        match self.config.compression_level {
            Some(level) => {
                let packed = zstd::encode_all(data, level)?;
                let mut framed = Vec::with_capacity(packed.len() + 1);
                framed.push(FRAME_ZSTD);
                framed.extend_from_slice(&packed);
                Ok(framed)
            }
            None => {
                let mut framed = Vec::with_capacity(data.len() + 1);
                framed.push(FRAME_RAW);
                framed.extend_from_slice(data);
                Ok(framed)
            }
        }
    }

    async fn load_ref(&self, repo: &str, name: &str) -> StoreResult<Option<CommitId>> {
        let path = self.ref_path(repo, name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                // A namespace directory, or a path running through a ref file,
                // holds no ref of this name.
                if self.ref_collision(repo, name).await.is_some() {
                    return Ok(None);
                }
                return Err(e.into());
            }
        };
        ContentHash::parse(text.trim())
            .map(|hash| Some(CommitId::new(hash)))
            .map_err(|e| StoreError::CorruptRef {
                repo: repo.to_string(),
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Why `name` cannot be stored alongside the refs already in `repo`:
    /// either refs live under `name/`, or a prefix of `name` is itself a ref.
    async fn ref_collision(&self, repo: &str, name: &str) -> Option<String> {
        if is_dir(&self.ref_path(repo, name)).await {
            return Some(format!("conflicts with existing refs under '{name}/'"));
        }
        for (end, _) in name.match_indices('/') {
            let prefix = &name[..end];
            if is_file(&self.ref_path(repo, prefix)).await {
                return Some(format!("conflicts with existing ref '{prefix}'"));
            }
        }
        None
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

fn corrupt(hash: &ContentHash, reason: impl Into<String>) -> StoreError {
    StoreError::CorruptObject {
        hash: *hash,
        reason: reason.into(),
    }
}

fn unframe(hash: &ContentHash, raw: Vec<u8>) -> StoreResult<Bytes> {
    match raw.first().copied() {
        Some(FRAME_RAW) => Ok(Bytes::from(raw).slice(1..)),
        Some(FRAME_ZSTD) => zstd::decode_all(&raw[1..])
            .map(Bytes::from)
            .map_err(|e| corrupt(hash, format!("zstd: {e}"))),
        Some(tag) => Err(corrupt(hash, format!("unknown frame tag {tag}"))),
        None => Err(corrupt(hash, "empty object file")),
    }
}

async fn load(hash: &ContentHash, path: &Path) -> StoreResult<Option<Bytes>> {
    match tokio::fs::read(path).await {
        Ok(raw) => unframe(hash, raw).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(
        ".tmp-{}-{}",
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    path.with_file_name(name)
}

async fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let tmp = temp_sibling(path);
    tokio::fs::write(&tmp, contents).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
        }
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for DiskObjectStore {
    async fn read_object(&self, hash: &ContentHash) -> StoreResult<Option<Bytes>> {
        let found = load(hash, &self.object_path(hash)).await?;
        trace!(%hash, len = ?found.as_ref().map(Bytes::len), "disk read");
        Ok(found)
    }

    async fn read_object_batch(
        &self,
        hashes: &[ContentHash],
    ) -> StoreResult<HashMap<ContentHash, Bytes>> {
        let unique: HashSet<ContentHash> = hashes.iter().copied().collect();
        let mut tasks = JoinSet::new();
        for hash in unique {
            let path = self.object_path(&hash);
            let readers = Arc::clone(&self.readers);
            tasks.spawn(async move {
                let _permit = readers
                    .acquire_owned()
                    .await
                    .map_err(|e| StoreError::Task(e.to_string()))?;
                load(&hash, &path).await.map(|found| (hash, found))
            });
        }

        let mut found = HashMap::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (hash, bytes) = joined.map_err(|e| StoreError::Task(e.to_string()))??;
            if let Some(bytes) = bytes {
                found.insert(hash, bytes);
            }
        }
        debug!(requested = hashes.len(), found = found.len(), "disk batch read");
        Ok(found)
    }

    async fn write_object(&self, hash: &ContentHash, data: Bytes, overwrite: bool) -> StoreResult<()> {
        let path = self.object_path(hash);
        if !overwrite && tokio::fs::try_exists(&path).await? {
            trace!(%hash, "disk write skipped, object present");
            return Ok(());
        }
        let framed = self.frame(&data)?;
        write_atomic(&path, &framed).await?;
        trace!(%hash, len = data.len(), stored = framed.len(), "disk write");
        Ok(())
    }

    async fn read_ref(&self, repo: &str, name: &str) -> StoreResult<Option<CommitId>> {
        validate_repo_name(repo)?;
        validate_ref_name(name)?;
        self.load_ref(repo, name).await
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
        let _guard = self.ref_lock.lock().await;
        let actual = self.load_ref(repo, name).await?;
        if actual != previous {
            debug!(repo, name, ?previous, ?actual, "ref CAS conflict");
            return Ok(CasOutcome::Conflict {
                expected: previous,
                actual,
            });
        }
        if let Some(reason) = self.ref_collision(repo, name).await {
            warn!(repo, name, %reason, "ref write rejected");
            return Err(StoreError::InvalidRefName {
                name: name.to_string(),
                reason,
            });
        }
        write_atomic(&self.ref_path(repo, name), format!("{new}\n").as_bytes()).await?;
        debug!(repo, name, %new, "ref CAS applied");
        Ok(CasOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open(dir: &TempDir) -> DiskObjectStore {
        DiskObjectStore::open(DiskStoreConfig::new(dir.path())).await.unwrap()
    }

    fn id(text: &str) -> CommitId {
        CommitId::new(ContentHash::hash_str(text))
    }

    // ---- Objects ----

    #[tokio::test]
    async fn open_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        assert!(dir.path().join("objects").is_dir());
        assert!(dir.path().join("refs").is_dir());
        assert_eq!(store.root(), dir.path());
    }

    #[tokio::test]
    async fn objects_are_sharded_by_hash() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        let hash = ContentHash::hash(b"abc");
        store.write_object(&hash, Bytes::from_static(b"abc"), false).await.unwrap();

        let expected = dir
            .path()
            .join("objects")
            .join("a9")
            .join("993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(store.object_path(&hash), expected);
        assert!(expected.is_file());
        assert_eq!(store.read_object(&hash).await.unwrap().unwrap(), Bytes::from_static(b"abc"));
    }

    #[tokio::test]
    async fn miss_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        assert!(store.read_object(&ContentHash::hash_str("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_payload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        let hash = ContentHash::hash(b"");
        store.write_object(&hash, Bytes::new(), false).await.unwrap();
        assert_eq!(store.read_object(&hash).await.unwrap(), Some(Bytes::new()));
    }

    #[tokio::test]
    async fn overwrite_flag() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        let hash = ContentHash::hash(b"a");
        store.write_object(&hash, Bytes::from_static(b"a"), false).await.unwrap();
        store.write_object(&hash, Bytes::from_static(b"b"), false).await.unwrap();
        assert_eq!(store.read_object(&hash).await.unwrap().unwrap(), Bytes::from_static(b"a"));
        store.write_object(&hash, Bytes::from_static(b"b"), true).await.unwrap();
        assert_eq!(store.read_object(&hash).await.unwrap().unwrap(), Bytes::from_static(b"b"));
    }

    #[tokio::test]
    async fn compressed_objects_survive_setting_change() {
        let dir = tempfile::tempdir().unwrap();
        let data = Bytes::from(vec![7u8; 4096]);
        let hash = ContentHash::hash(&data);
        {
            let config = DiskStoreConfig::new(dir.path()).with_compression(3);
            let store = DiskObjectStore::open(config).await.unwrap();
            store.write_object(&hash, data.clone(), false).await.unwrap();
            let on_disk = std::fs::read(store.object_path(&hash)).unwrap();
            assert_eq!(on_disk[0], FRAME_ZSTD);
            assert!(on_disk.len() < data.len());
        }
        let plain = open(&dir).await;
        assert_eq!(plain.read_object(&hash).await.unwrap().unwrap(), data);
    }

    #[tokio::test]
    async fn unknown_frame_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        let hash = ContentHash::hash(b"x");
        let path = store.object_path(&hash);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, [9u8, 1, 2]).unwrap();
        assert!(matches!(
            store.read_object(&hash).await,
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[tokio::test]
    async fn batch_read_bounded_fan_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DiskStoreConfig::new(dir.path());
        config.max_concurrency = 2;
        let store = DiskObjectStore::open(config).await.unwrap();

        let mut hashes = Vec::new();
        for i in 0..10u8 {
            let data = Bytes::from(vec![i; 8]);
            let hash = ContentHash::hash(&data);
            store.write_object(&hash, data, false).await.unwrap();
            hashes.push(hash);
        }
        let missing = ContentHash::hash_str("missing");
        hashes.push(missing);
        hashes.push(hashes[0]);

        let found = store.read_object_batch(&hashes).await.unwrap();
        assert_eq!(found.len(), 10);
        assert!(!found.contains_key(&missing));
        assert_eq!(found[&hashes[3]], Bytes::from(vec![3u8; 8]));
    }

    // ---- Refs ----

    #[tokio::test]
    async fn cas_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;

        assert!(store.write_ref(None, "repo", "main", id("x")).await.unwrap().is_applied());
        assert!(store.write_ref(Some(id("x")), "repo", "main", id("y")).await.unwrap().is_applied());
        assert_eq!(
            store.write_ref(Some(id("x")), "repo", "main", id("z")).await.unwrap(),
            CasOutcome::Conflict {
                expected: Some(id("x")),
                actual: Some(id("y")),
            }
        );
        assert_eq!(store.read_ref("repo", "main").await.unwrap(), Some(id("y")));
    }

    #[tokio::test]
    async fn refs_persist_and_nest() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open(&dir).await;
            assert!(store
                .write_ref(None, "repo", "feature/auth", id("a"))
                .await
                .unwrap()
                .is_applied());
        }
        let text = std::fs::read_to_string(dir.path().join("refs/repo/feature/auth")).unwrap();
        assert_eq!(text.trim(), id("a").to_string());

        let store = open(&dir).await;
        assert_eq!(store.read_ref("repo", "feature/auth").await.unwrap(), Some(id("a")));
        assert_eq!(store.read_ref("other", "feature/auth").await.unwrap(), None);
    }

    #[tokio::test]
    async fn namespace_and_nested_names_read_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        assert!(store
            .write_ref(None, "repo", "feature/auth", id("a"))
            .await
            .unwrap()
            .is_applied());

        assert_eq!(store.read_ref("repo", "feature").await.unwrap(), None);
        assert_eq!(store.read_ref("repo", "feature/auth/x").await.unwrap(), None);
        assert_eq!(store.read_ref("repo", "feature/auth").await.unwrap(), Some(id("a")));
    }

    #[tokio::test]
    async fn colliding_ref_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        assert!(store
            .write_ref(None, "repo", "feature/auth", id("a"))
            .await
            .unwrap()
            .is_applied());

        assert!(matches!(
            store.write_ref(None, "repo", "feature", id("b")).await,
            Err(StoreError::InvalidRefName { name, .. }) if name == "feature"
        ));
        assert!(matches!(
            store.write_ref(None, "repo", "feature/auth/x", id("b")).await,
            Err(StoreError::InvalidRefName { name, .. }) if name == "feature/auth/x"
        ));
        // A stale expectation still reports a conflict, not a name error.
        assert_eq!(
            store.write_ref(Some(id("z")), "repo", "feature", id("b")).await.unwrap(),
            CasOutcome::Conflict {
                expected: Some(id("z")),
                actual: None,
            }
        );
        assert_eq!(store.read_ref("repo", "feature/auth").await.unwrap(), Some(id("a")));
        assert!(store
            .write_ref(None, "repo", "feature/other", id("c"))
            .await
            .unwrap()
            .is_applied());
    }

    #[tokio::test]
    async fn garbage_ref_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        std::fs::create_dir_all(dir.path().join("refs/repo")).unwrap();
        std::fs::write(dir.path().join("refs/repo/main"), "not a hash").unwrap();
        assert!(matches!(
            store.read_ref("repo", "main").await,
            Err(StoreError::CorruptRef { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_cas_has_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open(&dir).await);
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .write_ref(None, "repo", "main", id(&i.to_string()))
                    .await
                    .unwrap()
            }));
        }
        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_applied() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }
}
