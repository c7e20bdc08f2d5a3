//! Standalone ordering and equality values.
//!
//! Every entity's ordering lives in a stateless comparer so collections can
//! pick one explicitly (a map sorts nodes by name only, for instance). The
//! `Ord` impls on the entities delegate to the default comparer of their type.

use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::hash::ContentHash;
use crate::node::TreeMapNode;
use crate::tree_ref::TreeRef;

/// Typed equality and hashing over `T`.
pub trait EqualityComparer<T: ?Sized> {
    fn equals(&self, a: &T, b: &T) -> bool;

    /// Hash consistent with [`EqualityComparer::equals`].
    fn hash_code(&self, value: &T) -> u64;
}

/// A total order over `T` whose equality agrees with the order.
pub trait Comparer<T: ?Sized>: EqualityComparer<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

macro_rules! equality_from_order {
    ($comparer:ty, $t:ty, |$value:ident| $hash:expr) => {
        impl EqualityComparer<$t> for $comparer {
            fn equals(&self, a: &$t, b: &$t) -> bool {
                self.compare(a, b) == Ordering::Equal
            }

            fn hash_code(&self, $value: &$t) -> u64 {
                $hash
            }
        }
    };
}

/// Hash a value with the standard library's default hasher.
pub fn hash_of<H: Hash + ?Sized>(value: &H) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Unsigned big-endian byte order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentHashComparer;

impl Comparer<ContentHash> for ContentHashComparer {
    fn compare(&self, a: &ContentHash, b: &ContentHash) -> Ordering {
        a.as_bytes().cmp(b.as_bytes())
    }
}

equality_from_order!(ContentHashComparer, ContentHash, |value| hash_of(value.as_bytes()));

/// Orders references by hash, then kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeRefComparer;

impl Comparer<TreeRef> for TreeRefComparer {
    fn compare(&self, a: &TreeRef, b: &TreeRef) -> Ordering {
        ContentHashComparer
            .compare(&a.hash, &b.hash)
            .then_with(|| a.kind.cmp(&b.kind))
    }
}

equality_from_order!(TreeRefComparer, TreeRef, |value| hash_of(&(
    value.hash.as_bytes(),
    value.kind.tag()
)));

/// Orders nodes by ordinal name, then hash, then kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeMapNodeComparer;

impl Comparer<TreeMapNode> for TreeMapNodeComparer {
    fn compare(&self, a: &TreeMapNode, b: &TreeMapNode) -> Ordering {
        a.name()
            .cmp(b.name())
            .then_with(|| ContentHashComparer.compare(&a.tree_ref().hash, &b.tree_ref().hash))
            .then_with(|| a.tree_ref().kind.cmp(&b.tree_ref().kind))
    }
}

equality_from_order!(TreeMapNodeComparer, TreeMapNode, |value| hash_of(&(
    value.name(),
    TreeRefComparer.hash_code(value.tree_ref())
)));

/// Orders nodes by ordinal name alone; the key order of a `TreeMap`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeMapNodeNameComparer;

impl Comparer<TreeMapNode> for TreeMapNodeNameComparer {
    fn compare(&self, a: &TreeMapNode, b: &TreeMapNode) -> Ordering {
        a.name().cmp(b.name())
    }
}

equality_from_order!(TreeMapNodeNameComparer, TreeMapNode, |value| hash_of(value.name()));
