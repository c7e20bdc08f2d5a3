use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use cairn_types::{Comparer, ContentHash, NodeKind, TreeRef, TreeRefComparer};

use crate::error::{TreeError, TreeResult};

/// An immutable sorted set of [`TreeRef`]s, ordered by hash then kind.
///
/// Set algebra runs as linear two-pointer scans over the sorted sequences.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TreeSet {
    refs: Option<Arc<[TreeRef]>>,
}

/// Counts gathered by one pass over two sorted sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Overlap {
    matched: usize,
    left_only: usize,
    right_only: usize,
}

impl TreeSet {
    pub const EMPTY: Self = Self { refs: None };

    pub fn new<I>(refs: I) -> Self
    where
        I: IntoIterator<Item = TreeRef>,
    {
        let mut sorted: Vec<TreeRef> = refs.into_iter().collect();
        sorted.sort_unstable_by(|a, b| TreeRefComparer.compare(a, b));
        sorted.dedup();
        Self::from_sorted(sorted)
    }

    fn from_sorted(refs: Vec<TreeRef>) -> Self {
        if refs.is_empty() {
            Self::EMPTY
        } else {
            Self {
                refs: Some(refs.into()),
            }
        }
    }

    /// Refs in canonical order.
    pub fn as_slice(&self) -> &[TreeRef] {
        self.refs.as_deref().unwrap_or(&[])
    }

    /// Number of distinct refs.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// `true` when the set holds no refs.
    pub fn is_empty(&self) -> bool {
        self.refs.is_none()
    }

    /// Iterate refs in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeRef> {
        self.as_slice().iter()
    }

    /// The ref at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&TreeRef> {
        self.as_slice().get(index)
    }

    /// The ref at `index`, or [`TreeError::IndexOutOfRange`].
    pub fn at(&self, index: usize) -> TreeResult<&TreeRef> {
        self.get(index).ok_or(TreeError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// `Ok(index)` when present, otherwise `Err(insertion_point)`.
    pub fn index_of(&self, tree_ref: &TreeRef) -> Result<usize, usize> {
        self.as_slice()
            .binary_search_by(|probe| TreeRefComparer.compare(probe, tree_ref))
    }

    /// `true` if `tree_ref` is a member.
    pub fn contains(&self, tree_ref: &TreeRef) -> bool {
        self.index_of(tree_ref).is_ok()
    }

    /// Insert `tree_ref`; an existing member returns an equal set.
    pub fn add(&self, tree_ref: TreeRef) -> Self {
        match self.index_of(&tree_ref) {
            Ok(_) => self.clone(),
            Err(i) => {
                let mut refs = self.as_slice().to_vec();
                refs.insert(i, tree_ref);
                Self::from_sorted(refs)
            }
        }
    }

    /// Insert the ref built from `kind` and `hash`.
    pub fn add_kind(&self, kind: NodeKind, hash: ContentHash) -> Self {
        self.add(TreeRef::new(kind, hash))
    }

    /// Drop `tree_ref`; an absent ref returns an equal set.
    pub fn remove(&self, tree_ref: &TreeRef) -> Self {
        match self.index_of(tree_ref) {
            Ok(i) => {
                let mut refs = self.as_slice().to_vec();
                refs.remove(i);
                Self::from_sorted(refs)
            }
            Err(_) => self.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Set algebra
    // -----------------------------------------------------------------------

    /// Walk both sorted sequences once, handing every element to `emit`
    /// together with the side(s) it was found on.
    fn scan<F>(&self, other: &TreeSet, mut emit: F)
    where
        F: FnMut(Side, &TreeRef),
    {
        let (left, right) = (self.as_slice(), other.as_slice());
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            match TreeRefComparer.compare(&left[i], &right[j]) {
                Ordering::Less => {
                    emit(Side::Left, &left[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    emit(Side::Right, &right[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    emit(Side::Both, &right[j]);
                    i += 1;
                    j += 1;
                }
            }
        }
        left[i..].iter().for_each(|r| emit(Side::Left, r));
        right[j..].iter().for_each(|r| emit(Side::Right, r));
    }

    fn collect<P>(&self, other: &TreeSet, keep: P) -> Self
    where
        P: Fn(Side) -> bool,
    {
        let mut refs = Vec::with_capacity(self.len() + other.len());
        self.scan(other, |side, r| {
            if keep(side) {
                refs.push(*r);
            }
        });
        Self::from_sorted(refs)
    }

    fn overlap(&self, other: &TreeSet) -> Overlap {
        let mut counts = Overlap::default();
        self.scan(other, |side, _| match side {
            Side::Both => counts.matched += 1,
            Side::Left => counts.left_only += 1,
            Side::Right => counts.right_only += 1,
        });
        counts
    }

    /// Elements in either set.
    pub fn union_with(&self, other: &TreeSet) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        self.collect(other, |_| true)
    }

    /// Elements of `self` that are absent from `other`.
    pub fn except_with(&self, other: &TreeSet) -> Self {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        self.collect(other, |side| side == Side::Left)
    }

    /// Elements present in both sets.
    pub fn intersect_with(&self, other: &TreeSet) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        self.collect(other, |side| side == Side::Both)
    }

    /// Elements present in exactly one of the sets.
    pub fn symmetric_except_with(&self, other: &TreeSet) -> Self {
        self.collect(other, |side| side != Side::Both)
    }

    pub fn is_subset_of(&self, other: &TreeSet) -> bool {
        self.len() <= other.len() && self.overlap(other).left_only == 0
    }

    pub fn is_proper_subset_of(&self, other: &TreeSet) -> bool {
        self.is_subset_of(other) && other.len() > self.len()
    }

    pub fn is_superset_of(&self, other: &TreeSet) -> bool {
        other.is_subset_of(self)
    }

    pub fn is_proper_superset_of(&self, other: &TreeSet) -> bool {
        other.is_proper_subset_of(self)
    }

    pub fn overlaps(&self, other: &TreeSet) -> bool {
        self.overlap(other).matched > 0
    }

    pub fn set_equals(&self, other: &TreeSet) -> bool {
        let o = self.overlap(other);
        o.left_only == 0 && o.right_only == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Both,
}

impl FromIterator<TreeRef> for TreeSet {
    fn from_iter<I: IntoIterator<Item = TreeRef>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Index<usize> for TreeSet {
    type Output = TreeRef;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a TreeSet {
    type Item = &'a TreeRef;
    type IntoIter = std::slice::Iter<'a, TreeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for TreeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
