use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::buffer::BufferPool;
use crate::error::{CodecError, CodecResult};
use crate::traits::WireFormat;

/// Compact codec built on `bincode`; hashes are written as raw bytes.
#[derive(Clone, Debug, Default)]
pub struct BinarySerializer {
    pool: BufferPool,
}

impl BinarySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(pool: BufferPool) -> Self {
        Self { pool }
    }
}

impl WireFormat for BinarySerializer {
    const NAME: &'static str = "binary";

    fn pool(&self) -> &BufferPool {
        &self.pool
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T, out: &mut Vec<u8>) -> CodecResult<()> {
        bincode::serialize_into(out, value).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ObjectSerializer;
    use cairn_tree::TreeList;
    use cairn_types::{ContentHash, NodeKind, TreeRef};

    #[test]
    fn tree_ref_is_tag_plus_raw_hash() {
        let codec = BinarySerializer::new();
        let list = TreeList::new(vec![TreeRef::new(NodeKind::Map, ContentHash::hash_str("abc"))]);
        let bytes = codec.serialize_tree_list(&list).unwrap();
        // u64 element count, kind tag, u64 digest length, digest
        assert_eq!(bytes.len(), 8 + 1 + 8 + 20);
        assert_eq!(bytes[8], NodeKind::Map.tag());
        assert_eq!(&bytes[17..], ContentHash::hash_str("abc").as_bytes());
    }

    #[test]
    fn truncated_input_fails() {
        let codec = BinarySerializer::new();
        let list = TreeList::new(vec![TreeRef::new(NodeKind::Blob, ContentHash::hash_str("x"))]);
        let bytes = codec.serialize_tree_list(&list).unwrap();
        assert!(matches!(
            codec.deserialize_tree_list(&bytes[..bytes.len() - 1]),
            Err(CodecError::Deserialization(_))
        ));
    }
}
