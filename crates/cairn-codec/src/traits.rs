use serde::de::DeserializeOwned;
use serde::Serialize;

use cairn_graph::Commit;
use cairn_tree::{TreeList, TreeMap, TreeSet};
use cairn_types::{TreeMapNode, TreeRef};

use crate::buffer::{BufferPool, BufferSession};
use crate::error::CodecResult;

/// Converts entities to and from bytes.
///
/// Repositories take one of these at construction. Every implementation must
/// agree on one rule: the canonical empty value of each entity (an empty
/// collection, or [`Commit::default`]) serializes to zero bytes, and zero
/// bytes deserialize back to that empty value. Empty entities therefore have
/// the same identity whichever codec wrote them.
pub trait ObjectSerializer: Send + Sync {
    /// Short codec name, used in logs.
    fn name(&self) -> &'static str;

    fn serialize_tree_map(&self, map: &TreeMap) -> CodecResult<BufferSession>;
    fn deserialize_tree_map(&self, bytes: &[u8]) -> CodecResult<TreeMap>;

    fn serialize_tree_list(&self, list: &TreeList) -> CodecResult<BufferSession>;
    fn deserialize_tree_list(&self, bytes: &[u8]) -> CodecResult<TreeList>;

    fn serialize_tree_set(&self, set: &TreeSet) -> CodecResult<BufferSession>;
    fn deserialize_tree_set(&self, bytes: &[u8]) -> CodecResult<TreeSet>;

    fn serialize_commit(&self, commit: &Commit) -> CodecResult<BufferSession>;
    fn deserialize_commit(&self, bytes: &[u8]) -> CodecResult<Commit>;
}

/// A serde data format plus a buffer pool; enough to implement
/// [`ObjectSerializer`] for every entity.
pub trait WireFormat: Send + Sync {
    const NAME: &'static str;

    fn pool(&self) -> &BufferPool;

    fn encode<T: Serialize + ?Sized>(&self, value: &T, out: &mut Vec<u8>) -> CodecResult<()>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T>;

    /// Encode into a pooled session; on failure the buffer goes back to the pool.
    fn encode_pooled<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<BufferSession> {
        let mut session = self.pool().acquire();
        self.encode(value, session.buffer_mut())?;
        Ok(session)
    }
}

impl<F: WireFormat> ObjectSerializer for F {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn serialize_tree_map(&self, map: &TreeMap) -> CodecResult<BufferSession> {
        if map.is_empty() {
            return Ok(self.pool().acquire());
        }
        self.encode_pooled(map.as_slice())
    }

    fn deserialize_tree_map(&self, bytes: &[u8]) -> CodecResult<TreeMap> {
        if bytes.is_empty() {
            return Ok(TreeMap::EMPTY);
        }
        let nodes: Vec<TreeMapNode> = self.decode(bytes)?;
        Ok(TreeMap::new(nodes)?)
    }

    fn serialize_tree_list(&self, list: &TreeList) -> CodecResult<BufferSession> {
        if list.is_empty() {
            return Ok(self.pool().acquire());
        }
        self.encode_pooled(list.as_slice())
    }

    fn deserialize_tree_list(&self, bytes: &[u8]) -> CodecResult<TreeList> {
        if bytes.is_empty() {
            return Ok(TreeList::EMPTY);
        }
        let refs: Vec<TreeRef> = self.decode(bytes)?;
        Ok(TreeList::new(refs))
    }

    fn serialize_tree_set(&self, set: &TreeSet) -> CodecResult<BufferSession> {
        if set.is_empty() {
            return Ok(self.pool().acquire());
        }
        self.encode_pooled(set.as_slice())
    }

    fn deserialize_tree_set(&self, bytes: &[u8]) -> CodecResult<TreeSet> {
        if bytes.is_empty() {
            return Ok(TreeSet::EMPTY);
        }
        let refs: Vec<TreeRef> = self.decode(bytes)?;
        Ok(TreeSet::new(refs))
    }

    fn serialize_commit(&self, commit: &Commit) -> CodecResult<BufferSession> {
        if commit.is_empty() {
            return Ok(self.pool().acquire());
        }
        self.encode_pooled(commit)
    }

    fn deserialize_commit(&self, bytes: &[u8]) -> CodecResult<Commit> {
        if bytes.is_empty() {
            return Ok(Commit::default());
        }
        self.decode(bytes)
    }
}
