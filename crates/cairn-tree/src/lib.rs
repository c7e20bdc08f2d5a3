//! Immutable tree collections for Cairn.
//!
//! All three collections are values: operations return new instances and
//! never alter the receiver, so a collection can be shared across threads
//! without locking. Each has a single canonical empty value.
//!
//! - [`TreeMap`] — name-sorted, unique-key map of [`TreeMapNode`](cairn_types::TreeMapNode)s
//! - [`TreeList`] — caller-ordered list of [`TreeRef`](cairn_types::TreeRef)s, duplicates allowed
//! - [`TreeSet`] — sorted, duplicate-free set of [`TreeRef`](cairn_types::TreeRef)s

pub mod comparer;
pub mod error;
pub mod list;
pub mod map;
pub mod optional;
pub mod set;

pub use comparer::{TreeListComparer, TreeMapComparer, TreeSetComparer};
pub use error::{TreeError, TreeResult};
pub use list::TreeList;
pub use map::TreeMap;
pub use optional::OptionalTreeMap;
pub use set::TreeSet;
