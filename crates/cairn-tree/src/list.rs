use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use cairn_types::TreeRef;

use crate::error::{TreeError, TreeResult};

/// An immutable sequence of [`TreeRef`]s in caller order.
///
/// Unlike [`TreeMap`](crate::TreeMap) and [`TreeSet`](crate::TreeSet), a list
/// is never sorted and keeps duplicates. Equality is positional.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TreeList {
    refs: Option<Arc<[TreeRef]>>,
}

impl TreeList {
    pub const EMPTY: Self = Self { refs: None };

    pub fn new<I>(refs: I) -> Self
    where
        I: IntoIterator<Item = TreeRef>,
    {
        Self::from_vec(refs.into_iter().collect())
    }

    fn from_vec(refs: Vec<TreeRef>) -> Self {
        if refs.is_empty() {
            Self::EMPTY
        } else {
            Self {
                refs: Some(refs.into()),
            }
        }
    }

    /// Refs in insertion order.
    pub fn as_slice(&self) -> &[TreeRef] {
        self.refs.as_deref().unwrap_or(&[])
    }

    /// Number of refs, duplicates included.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// `true` when the list holds no refs.
    pub fn is_empty(&self) -> bool {
        self.refs.is_none()
    }

    /// Iterate refs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeRef> {
        self.as_slice().iter()
    }

    /// The ref at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&TreeRef> {
        self.as_slice().get(index)
    }

    /// The ref at `index`, or [`TreeError::IndexOutOfRange`].
    pub fn at(&self, index: usize) -> TreeResult<&TreeRef> {
        self.get(index).ok_or_else(|| self.out_of_range(index))
    }

    /// Position of the first occurrence of `tree_ref`.
    pub fn index_of(&self, tree_ref: &TreeRef) -> Option<usize> {
        self.iter().position(|r| r == tree_ref)
    }

    /// `true` if `tree_ref` occurs at least once.
    pub fn contains(&self, tree_ref: &TreeRef) -> bool {
        self.index_of(tree_ref).is_some()
    }

    /// Append `tree_ref`.
    pub fn add(&self, tree_ref: TreeRef) -> Self {
        let mut refs = Vec::with_capacity(self.len() + 1);
        refs.extend_from_slice(self.as_slice());
        refs.push(tree_ref);
        Self::from_vec(refs)
    }

    /// Insert at `index`; `index == len()` appends.
    pub fn insert(&self, index: usize, tree_ref: TreeRef) -> TreeResult<Self> {
        if index > self.len() {
            return Err(self.out_of_range(index));
        }
        let mut refs = self.as_slice().to_vec();
        refs.insert(index, tree_ref);
        Ok(Self::from_vec(refs))
    }

    /// Drop the ref at `index`.
    pub fn remove_at(&self, index: usize) -> TreeResult<Self> {
        if index >= self.len() {
            return Err(self.out_of_range(index));
        }
        let mut refs = self.as_slice().to_vec();
        refs.remove(index);
        Ok(Self::from_vec(refs))
    }

    /// Remove the first occurrence of `tree_ref`, if any.
    pub fn remove(&self, tree_ref: &TreeRef) -> Self {
        match self.index_of(tree_ref) {
            Some(i) => {
                let mut refs = self.as_slice().to_vec();
                refs.remove(i);
                Self::from_vec(refs)
            }
            None => self.clone(),
        }
    }

    /// Drop every ref matching `predicate`, keeping the rest in order.
    pub fn remove_where<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&TreeRef) -> bool,
    {
        let kept: Vec<TreeRef> = self.iter().filter(|r| !predicate(r)).copied().collect();
        if kept.len() == self.len() {
            return self.clone();
        }
        Self::from_vec(kept)
    }

    fn out_of_range(&self, index: usize) -> TreeError {
        TreeError::IndexOutOfRange {
            index,
            len: self.len(),
        }
    }
}

impl FromIterator<TreeRef> for TreeList {
    fn from_iter<I: IntoIterator<Item = TreeRef>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Index<usize> for TreeList {
    type Output = TreeRef;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a TreeList {
    type Item = &'a TreeRef;
    type IntoIter = std::slice::Iter<'a, TreeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for TreeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_types::{ContentHash, NodeKind};

    fn r(n: u8) -> TreeRef {
        TreeRef::new(NodeKind::Blob, ContentHash::from_bytes([n; 20]))
    }

    fn list(ns: &[u8]) -> TreeList {
        ns.iter().map(|&n| r(n)).collect()
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let l = list(&[3, 1, 3]);
        assert_eq!(l.as_slice(), &[r(3), r(1), r(3)]);
        assert_ne!(l, list(&[1, 3, 3]));
        assert_eq!(TreeList::new(Vec::new()), TreeList::EMPTY);
    }

    #[test]
    fn insert_bounds() {
        let l = list(&[1, 3]);
        assert_eq!(l.insert(1, r(2)).unwrap(), list(&[1, 2, 3]));
        assert_eq!(l.insert(2, r(4)).unwrap(), list(&[1, 3, 4]));
        assert_eq!(
            l.insert(3, r(4)),
            Err(TreeError::IndexOutOfRange { index: 3, len: 2 })
        );
        assert_eq!(TreeList::EMPTY.insert(0, r(1)).unwrap(), list(&[1]));
    }

    #[test]
    fn remove_at_bounds() {
        let l = list(&[1, 2]);
        assert_eq!(l.remove_at(0).unwrap(), list(&[2]));
        assert_eq!(l.remove_at(1).unwrap().remove_at(0).unwrap(), TreeList::EMPTY);
        assert!(l.remove_at(2).is_err());
        assert!(TreeList::EMPTY.remove_at(0).is_err());
    }

    #[test]
    fn remove_takes_first_occurrence() {
        let l = list(&[1, 2, 1]);
        assert_eq!(l.remove(&r(1)), list(&[2, 1]));
        assert_eq!(l.remove(&r(9)), l);
    }

    #[test]
    fn remove_where_keeps_relative_order() {
        let l = list(&[1, 2, 3, 4, 2]);
        assert_eq!(l.remove_where(|x| *x == r(2)), list(&[1, 3, 4]));
        assert_eq!(l.remove_where(|_| false), l);
    }

    #[test]
    fn lookup() {
        let l = list(&[5, 6, 5]);
        assert_eq!(l.index_of(&r(5)), Some(0));
        assert_eq!(l.index_of(&r(7)), None);
        assert!(l.contains(&r(6)));
        assert_eq!(l[1], r(6));
        assert_eq!(l.add(r(7)).at(3).unwrap(), &r(7));
        assert!(l.at(3).is_err());
    }
}
