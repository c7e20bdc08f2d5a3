//! Equality comparers for whole collections.

use cairn_types::{hash_of, EqualityComparer, TreeMapNodeComparer, TreeRefComparer};

use crate::{TreeList, TreeMap, TreeSet};

fn hash_seq<'a, T: 'a, C, I>(comparer: C, items: I) -> u64
where
    C: EqualityComparer<T>,
    I: ExactSizeIterator<Item = &'a T>,
{
    let len = items.len();
    let codes: Vec<u64> = items.map(|item| comparer.hash_code(item)).collect();
    hash_of(&(len, codes))
}

fn equal_seq<T, C: EqualityComparer<T>>(comparer: C, a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| comparer.equals(x, y))
}

/// Node-by-node equality of two maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeMapComparer;

impl EqualityComparer<TreeMap> for TreeMapComparer {
    fn equals(&self, a: &TreeMap, b: &TreeMap) -> bool {
        equal_seq(TreeMapNodeComparer, a.as_slice(), b.as_slice())
    }

    fn hash_code(&self, value: &TreeMap) -> u64 {
        hash_seq(TreeMapNodeComparer, value.iter())
    }
}

/// Positional equality of two lists.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeListComparer;

impl EqualityComparer<TreeList> for TreeListComparer {
    fn equals(&self, a: &TreeList, b: &TreeList) -> bool {
        equal_seq(TreeRefComparer, a.as_slice(), b.as_slice())
    }

    fn hash_code(&self, value: &TreeList) -> u64 {
        hash_seq(TreeRefComparer, value.iter())
    }
}

/// Element-wise equality of two canonical sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeSetComparer;

impl EqualityComparer<TreeSet> for TreeSetComparer {
    fn equals(&self, a: &TreeSet, b: &TreeSet) -> bool {
        equal_seq(TreeRefComparer, a.as_slice(), b.as_slice())
    }

    fn hash_code(&self, value: &TreeSet) -> u64 {
        hash_seq(TreeRefComparer, value.iter())
    }
}
