use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comparer::{Comparer, TreeMapNodeComparer};
use crate::error::{TypeError, TypeResult};
use crate::hash::ContentHash;
use crate::ids::{BlobId, ListId, MapId, SetId};
use crate::kind::NodeKind;
use crate::tree_ref::TreeRef;

/// A named entry of a `TreeMap`.
///
/// The name is never empty or all whitespace; construction rejects such names
/// so every node that exists is a valid map key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct TreeMapNode {
    name: String,
    tree_ref: TreeRef,
}

#[derive(Serialize, Deserialize)]
struct RawNode {
    name: String,
    kind: NodeKind,
    hash: ContentHash,
}

impl TryFrom<RawNode> for TreeMapNode {
    type Error = TypeError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        Self::with_kind(raw.name, raw.kind, raw.hash)
    }
}

impl From<TreeMapNode> for RawNode {
    fn from(node: TreeMapNode) -> Self {
        Self {
            name: node.name,
            kind: node.tree_ref.kind,
            hash: node.tree_ref.hash,
        }
    }
}

impl TreeMapNode {
    pub fn new(name: impl Into<String>, tree_ref: TreeRef) -> TypeResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::Argument {
                name: "name",
                reason: "node name must not be empty or whitespace".into(),
            });
        }
        Ok(Self { name, tree_ref })
    }

    pub fn with_kind(name: impl Into<String>, kind: NodeKind, hash: ContentHash) -> TypeResult<Self> {
        Self::new(name, TreeRef::new(kind, hash))
    }

    pub fn blob(name: impl Into<String>, id: BlobId) -> TypeResult<Self> {
        Self::new(name, TreeRef::blob(id))
    }

    pub fn map(name: impl Into<String>, id: MapId) -> TypeResult<Self> {
        Self::new(name, TreeRef::map(id))
    }

    pub fn list(name: impl Into<String>, id: ListId) -> TypeResult<Self> {
        Self::new(name, TreeRef::list(id))
    }

    pub fn set(name: impl Into<String>, id: SetId) -> TypeResult<Self> {
        Self::new(name, TreeRef::set(id))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree_ref(&self) -> &TreeRef {
        &self.tree_ref
    }

    pub fn kind(&self) -> NodeKind {
        self.tree_ref.kind
    }

    pub fn hash(&self) -> ContentHash {
        self.tree_ref.hash
    }

    pub fn blob_id(&self) -> TypeResult<BlobId> {
        self.narrow(NodeKind::Blob).map(BlobId::new)
    }

    pub fn map_id(&self) -> TypeResult<MapId> {
        self.narrow(NodeKind::Map).map(MapId::new)
    }

    pub fn list_id(&self) -> TypeResult<ListId> {
        self.narrow(NodeKind::List).map(ListId::new)
    }

    pub fn set_id(&self) -> TypeResult<SetId> {
        self.narrow(NodeKind::Set).map(SetId::new)
    }

    fn narrow(&self, expected: NodeKind) -> TypeResult<ContentHash> {
        self.tree_ref.expect_kind(expected, Some(&self.name))
    }

    pub fn into_parts(self) -> (String, TreeRef) {
        (self.name, self.tree_ref)
    }
}

impl PartialOrd for TreeMapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeMapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        TreeMapNodeComparer.compare(self, other)
    }
}

impl fmt::Debug for TreeMapNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.name, self.tree_ref)
    }
}

impl fmt::Display for TreeMapNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.name,
            self.tree_ref.kind,
            self.tree_ref.hash.to_formatted(crate::hash::HashFormat::Dashed)
        )
    }
}
