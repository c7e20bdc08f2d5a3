//! Object serializers for Cairn.
//!
//! Repositories never pick a wire format themselves; they are handed an
//! [`ObjectSerializer`] when built. Two implementations ship here:
//!
//! - [`JsonSerializer`] — compact JSON, hashes as hex text
//! - [`BinarySerializer`] — `bincode`, hashes as raw bytes
//!
//! Serializing returns a [`BufferSession`] borrowed from a [`BufferPool`];
//! dropping the session returns the buffer.

pub mod binary;
pub mod buffer;
pub mod error;
pub mod json;
pub mod traits;

pub use binary::BinarySerializer;
pub use buffer::{BufferPool, BufferSession};
pub use error::{CodecError, CodecResult};
pub use json::JsonSerializer;
pub use traits::{ObjectSerializer, WireFormat};
