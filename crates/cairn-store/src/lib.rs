//! Backing byte stores for Cairn.
//!
//! A store knows nothing about maps or commits: it keeps opaque bytes keyed
//! by [`ContentHash`](cairn_types::ContentHash) and a small table of named
//! refs per repository, updated only by compare-and-swap.
//!
//! # Key Types
//!
//! - [`ObjectStore`] — the async store contract
//! - [`CasOutcome`] — applied or conflict, for ref writes
//! - [`InMemoryObjectStore`] — HashMap-backed store for tests and embedding
//! - [`DiskObjectStore`] — sharded on-disk store with optional zstd
//! - [`DiskStoreConfig`] — settings for the on-disk store

pub mod config;
pub mod disk;
pub mod error;
pub mod memory;
pub mod names;
pub mod traits;

pub use config::DiskStoreConfig;
pub use disk::DiskObjectStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use names::{validate_ref_name, validate_repo_name};
pub use traits::{CasOutcome, ObjectStore};
