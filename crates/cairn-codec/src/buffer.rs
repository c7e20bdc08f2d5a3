//! Pooled output buffers for serializers.
//!
//! A [`BufferSession`] owns a byte buffer borrowed from a [`BufferPool`] and
//! hands it back when dropped, whichever way the caller leaves scope. A
//! session that is never returned only costs the pool one buffer.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

const DEFAULT_MAX_POOLED: usize = 64;
const DEFAULT_CAPACITY: usize = 1024;
/// Buffers that grew past this are dropped instead of pooled.
const MAX_RETAINED_CAPACITY: usize = 1 << 20;

/// A bounded free-list of byte buffers, cheap to clone and share.
#[derive(Clone)]
pub struct BufferPool {
    free: Arc<Mutex<Vec<Vec<u8>>>>,
    max_pooled: usize,
}

impl BufferPool {
    pub fn new(max_pooled: usize) -> Self {
        Self {
            free: Arc::new(Mutex::new(Vec::new())),
            max_pooled,
        }
    }

    /// Take a cleared buffer from the pool, or allocate one.
    pub fn acquire(&self) -> BufferSession {
        let recycled = self.free.lock().ok().and_then(|mut free| free.pop());
        BufferSession {
            buf: recycled.unwrap_or_else(|| Vec::with_capacity(DEFAULT_CAPACITY)),
            pool: Some(self.clone()),
        }
    }

    /// Buffers currently waiting in the pool.
    pub fn available(&self) -> usize {
        self.free.lock().map(|free| free.len()).unwrap_or(0)
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        if let Ok(mut free) = self.free.lock() {
            if free.len() < self.max_pooled {
                free.push(buf);
            }
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POOLED)
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("available", &self.available())
            .field("max_pooled", &self.max_pooled)
            .finish()
    }
}

/// Serialized bytes on loan from a [`BufferPool`].
pub struct BufferSession {
    buf: Vec<u8>,
    pool: Option<BufferPool>,
}

impl BufferSession {
    /// A session that belongs to no pool.
    pub fn detached(buf: Vec<u8>) -> Self {
        Self { buf, pool: None }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// Take the bytes out, leaving the pool to allocate a replacement.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.pool = None;
        std::mem::take(&mut self.buf)
    }
}

impl Deref for BufferSession {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl AsRef<[u8]> for BufferSession {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for BufferSession {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(std::mem::take(&mut self.buf));
        }
    }
}

impl fmt::Debug for BufferSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferSession")
            .field("len", &self.buf.len())
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}
