use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comparer::{Comparer, TreeRefComparer};
use crate::error::{TypeError, TypeResult};
use crate::hash::ContentHash;
use crate::ids::{BlobId, ListId, MapId, SetId};
use crate::kind::NodeKind;

/// A `(kind, hash)` pointer to a blob or a sub-collection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeRef {
    pub kind: NodeKind,
    pub hash: ContentHash,
}

impl TreeRef {
    pub const fn new(kind: NodeKind, hash: ContentHash) -> Self {
        Self { kind, hash }
    }

    /// Build from an untrusted wire tag, rejecting unknown kinds.
    pub fn from_raw(tag: u8, hash: ContentHash) -> TypeResult<Self> {
        Ok(Self::new(NodeKind::try_from(tag)?, hash))
    }

    pub fn blob(id: BlobId) -> Self {
        Self::new(NodeKind::Blob, id.hash())
    }

    pub fn map(id: MapId) -> Self {
        Self::new(NodeKind::Map, id.hash())
    }

    pub fn list(id: ListId) -> Self {
        Self::new(NodeKind::List, id.hash())
    }

    pub fn set(id: SetId) -> Self {
        Self::new(NodeKind::Set, id.hash())
    }

    pub fn blob_id(&self) -> TypeResult<BlobId> {
        self.expect_kind(NodeKind::Blob, None).map(BlobId::new)
    }

    pub fn map_id(&self) -> TypeResult<MapId> {
        self.expect_kind(NodeKind::Map, None).map(MapId::new)
    }

    pub fn list_id(&self) -> TypeResult<ListId> {
        self.expect_kind(NodeKind::List, None).map(ListId::new)
    }

    pub fn set_id(&self) -> TypeResult<SetId> {
        self.expect_kind(NodeKind::Set, None).map(SetId::new)
    }

    pub(crate) fn expect_kind(
        &self,
        expected: NodeKind,
        name: Option<&str>,
    ) -> TypeResult<ContentHash> {
        if self.kind != expected {
            return Err(TypeError::InvalidOperation {
                expected,
                actual: self.kind,
                name: name.map(str::to_string),
            });
        }
        Ok(self.hash)
    }
}

impl PartialOrd for TreeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        TreeRefComparer.compare(self, other)
    }
}

impl fmt::Debug for TreeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.hash.short_hex())
    }
}

impl fmt::Display for TreeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.hash)
    }
}

impl From<BlobId> for TreeRef {
    fn from(id: BlobId) -> Self {
        Self::blob(id)
    }
}

impl From<MapId> for TreeRef {
    fn from(id: MapId) -> Self {
        Self::map(id)
    }
}

impl From<ListId> for TreeRef {
    fn from(id: ListId) -> Self {
        Self::list(id)
    }
}

impl From<SetId> for TreeRef {
    fn from(id: SetId) -> Self {
        Self::set(id)
    }
}
