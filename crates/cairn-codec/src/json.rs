use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::buffer::BufferPool;
use crate::error::{CodecError, CodecResult};
use crate::traits::WireFormat;

/// Human-readable codec: compact JSON, hashes as lowercase hex.
#[derive(Clone, Debug, Default)]
pub struct JsonSerializer {
    pool: BufferPool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(pool: BufferPool) -> Self {
        Self { pool }
    }
}

impl WireFormat for JsonSerializer {
    const NAME: &'static str = "json";

    fn pool(&self) -> &BufferPool {
        &self.pool
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T, out: &mut Vec<u8>) -> CodecResult<()> {
        serde_json::to_writer(out, value).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialization(e.to_string()))
    }
}
