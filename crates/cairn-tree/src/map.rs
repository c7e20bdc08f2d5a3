use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use cairn_types::{Comparer, NodeKind, TreeMapNode, TreeMapNodeComparer, TreeRef};

use crate::error::{TreeError, TreeResult};

/// An immutable, name-sorted, duplicate-free collection of [`TreeMapNode`]s.
///
/// Built once by sorting and deduplicating its input; every "mutating"
/// operation returns a new map and leaves the receiver untouched. A map with
/// no nodes always equals [`TreeMap::EMPTY`], however it was produced.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TreeMap {
    nodes: Option<Arc<[TreeMapNode]>>,
}

impl TreeMap {
    pub const EMPTY: Self = Self { nodes: None };

    /// Sort and deduplicate `nodes`.
    ///
    /// Repeated nodes that are identical collapse into one. Two nodes that
    /// share a name but differ in kind or hash fail with
    /// [`TreeError::DuplicateName`].
    pub fn new<I>(nodes: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = TreeMapNode>,
    {
        let mut sorted: Vec<TreeMapNode> = nodes.into_iter().collect();
        sorted.sort_unstable_by(|a, b| TreeMapNodeComparer.compare(a, b));

        let mut distinct: Vec<TreeMapNode> = Vec::with_capacity(sorted.len());
        for node in sorted {
            if let Some(prev) = distinct.last() {
                if prev.name() == node.name() {
                    if prev.tree_ref() == node.tree_ref() {
                        continue;
                    }
                    return Err(TreeError::DuplicateName {
                        name: node.name().to_string(),
                        existing: *prev.tree_ref(),
                        conflicting: *node.tree_ref(),
                    });
                }
            }
            distinct.push(node);
        }
        Ok(Self::from_sorted(distinct))
    }

    /// Wrap nodes that are already sorted by name and unique.
    fn from_sorted(nodes: Vec<TreeMapNode>) -> Self {
        if nodes.is_empty() {
            Self::EMPTY
        } else {
            Self {
                nodes: Some(nodes.into()),
            }
        }
    }

    /// Nodes in name order.
    pub fn as_slice(&self) -> &[TreeMapNode] {
        self.nodes.as_deref().unwrap_or(&[])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// `true` when the map holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_none()
    }

    /// Iterate nodes in name order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeMapNode> {
        self.as_slice().iter()
    }

    /// Node names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(TreeMapNode::name)
    }

    /// Node refs in name order.
    pub fn tree_refs(&self) -> impl Iterator<Item = &TreeRef> + '_ {
        self.iter().map(TreeMapNode::tree_ref)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Binary search by ordinal name: `Ok(index)` when present, otherwise
    /// `Err(insertion_point)`.
    pub fn index_of(&self, name: &str) -> Result<usize, usize> {
        self.as_slice().binary_search_by(|node| node.name().cmp(name))
    }

    /// `true` if a node is named `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.index_of(name).is_ok()
    }

    /// The node named `name`, if any.
    pub fn try_get(&self, name: &str) -> Option<&TreeMapNode> {
        self.index_of(name).ok().map(|i| &self.as_slice()[i])
    }

    /// Like [`TreeMap::try_get`], but also requires the node to be of `kind`.
    pub fn try_get_kind(&self, name: &str, kind: NodeKind) -> Option<&TreeMapNode> {
        self.try_get(name).filter(|node| node.kind() == kind)
    }

    /// The node named `name`, or [`TreeError::KeyNotFound`].
    pub fn node(&self, name: &str) -> TreeResult<&TreeMapNode> {
        self.try_get(name)
            .ok_or_else(|| TreeError::KeyNotFound(name.to_string()))
    }

    /// The node at `index` in name order, if in range.
    pub fn get(&self, index: usize) -> Option<&TreeMapNode> {
        self.as_slice().get(index)
    }

    /// The node at `index`, or [`TreeError::IndexOutOfRange`].
    pub fn node_at(&self, index: usize) -> TreeResult<&TreeMapNode> {
        self.get(index).ok_or(TreeError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    // -----------------------------------------------------------------------
    // Merge & remove
    // -----------------------------------------------------------------------

    /// Insert `node`, replacing any existing node with the same name.
    pub fn merge_node(&self, node: TreeMapNode) -> Self {
        let current = self.as_slice();
        let mut nodes = Vec::with_capacity(current.len() + 1);
        match self.index_of(node.name()) {
            Ok(i) => {
                nodes.extend_from_slice(current);
                nodes[i] = node;
            }
            Err(i) => {
                nodes.extend_from_slice(&current[..i]);
                nodes.push(node);
                nodes.extend_from_slice(&current[i..]);
            }
        }
        Self::from_sorted(nodes)
    }

    /// Build a node from `name` and `tree_ref`, then merge it in.
    pub fn merge_entry(&self, name: impl Into<String>, tree_ref: TreeRef) -> TreeResult<Self> {
        Ok(self.merge_node(TreeMapNode::new(name, tree_ref)?))
    }

    /// Merge two maps; on a shared name the node from `other` wins.
    pub fn merge(&self, other: &TreeMap) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }

        let (left, right) = (self.as_slice(), other.as_slice());
        let mut nodes = Vec::with_capacity(left.len() + right.len());
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            match left[i].name().cmp(right[j].name()) {
                std::cmp::Ordering::Less => {
                    nodes.push(left[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    nodes.push(right[j].clone());
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    nodes.push(right[j].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        nodes.extend_from_slice(&left[i..]);
        nodes.extend_from_slice(&right[j..]);
        Self::from_sorted(nodes)
    }

    /// Canonicalize an unordered batch of nodes, then merge it in.
    pub fn merge_all<I>(&self, nodes: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = TreeMapNode>,
    {
        Ok(self.merge(&TreeMap::new(nodes)?))
    }

    /// Drop the node named `name`; returns an equal map if it is absent.
    pub fn remove(&self, name: &str) -> Self {
        match self.index_of(name) {
            Ok(i) => {
                let mut nodes = self.as_slice().to_vec();
                nodes.remove(i);
                Self::from_sorted(nodes)
            }
            Err(_) => self.clone(),
        }
    }

    pub fn remove_where<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        let kept: Vec<TreeMapNode> = self
            .iter()
            .filter(|node| !predicate(node.name()))
            .cloned()
            .collect();
        if kept.len() == self.len() {
            return self.clone();
        }
        Self::from_sorted(kept)
    }
}

impl Index<usize> for TreeMap {
    type Output = TreeMapNode;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> Index<&'a str> for TreeMap {
    type Output = TreeMapNode;

    fn index(&self, name: &'a str) -> &Self::Output {
        match self.try_get(name) {
            Some(node) => node,
            None => panic!("key not found: {name:?}"),
        }
    }
}

impl<'a> IntoIterator for &'a TreeMap {
    type Item = &'a TreeMapNode;
    type IntoIter = std::slice::Iter<'a, TreeMapNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for TreeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_types::{BlobId, ContentHash, MapId};
    use proptest::prelude::*;

    fn blob(name: &str) -> TreeMapNode {
        TreeMapNode::blob(name, BlobId::of(name.as_bytes())).unwrap()
    }

    fn blob_with(name: &str, content: &str) -> TreeMapNode {
        TreeMapNode::blob(name, BlobId::of(content.as_bytes())).unwrap()
    }

    fn names(map: &TreeMap) -> Vec<&str> {
        map.keys().collect()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn empty_inputs_share_one_value() {
        let from_vec = TreeMap::new(Vec::new()).unwrap();
        let from_iter = TreeMap::new(std::iter::empty()).unwrap();
        assert_eq!(from_vec, TreeMap::EMPTY);
        assert_eq!(from_iter, TreeMap::EMPTY);
        assert_eq!(TreeMap::default(), TreeMap::EMPTY);
        assert!(TreeMap::EMPTY.is_empty());
        assert_eq!(TreeMap::EMPTY.len(), 0);
    }

    #[test]
    fn sorts_by_ordinal_name() {
        let map = TreeMap::new(vec![blob("c"), blob("a"), blob("B"), blob("b")]).unwrap();
        assert_eq!(names(&map), vec!["B", "a", "b", "c"]);
    }

    #[test]
    fn identical_duplicates_collapse() {
        let map = TreeMap::new(vec![blob("a"), blob("b"), blob("a"), blob("a")]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(names(&map), vec!["a", "b"]);
    }

    #[test]
    fn conflicting_duplicates_fail() {
        let err = TreeMap::new(vec![blob("a"), blob_with("a", "other")]).unwrap_err();
        match err {
            TreeError::DuplicateName { name, existing, conflicting } => {
                assert_eq!(name, "a");
                assert_ne!(existing, conflicting);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn same_name_different_kind_conflicts() {
        let hash = ContentHash::hash_str("x");
        let a = TreeMapNode::blob("x", BlobId::new(hash)).unwrap();
        let b = TreeMapNode::map("x", MapId::new(hash)).unwrap();
        assert!(matches!(
            TreeMap::new(vec![a, b]),
            Err(TreeError::DuplicateName { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    #[test]
    fn index_of_reports_insertion_point() {
        let map = TreeMap::new(vec![blob("b"), blob("d")]).unwrap();
        assert_eq!(map.index_of("b"), Ok(0));
        assert_eq!(map.index_of("d"), Ok(1));
        assert_eq!(map.index_of("a"), Err(0));
        assert_eq!(map.index_of("c"), Err(1));
        assert_eq!(map.index_of("e"), Err(2));
        assert_eq!(TreeMap::EMPTY.index_of("a"), Err(0));
    }

    #[test]
    fn try_get_never_fails() {
        let map = TreeMap::new(vec![blob("a")]).unwrap();
        assert_eq!(map.try_get("a"), Some(&blob("a")));
        assert_eq!(map.try_get("z"), None);
        assert!(map.contains_key("a"));
        assert!(!map.contains_key("z"));
    }

    #[test]
    fn try_get_kind_filters_on_kind() {
        let map = TreeMap::new(vec![blob("a")]).unwrap();
        assert!(map.try_get_kind("a", NodeKind::Blob).is_some());
        assert!(map.try_get_kind("a", NodeKind::Map).is_none());
        assert!(map.try_get_kind("z", NodeKind::Blob).is_none());
    }

    #[test]
    fn keyed_access_reports_missing_key() {
        let map = TreeMap::new(vec![blob("a")]).unwrap();
        assert_eq!(map.node("a").unwrap(), &blob("a"));
        assert_eq!(map.node("z"), Err(TreeError::KeyNotFound("z".into())));
        assert_eq!(map["a"], blob("a"));
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn indexing_missing_key_panics() {
        let map = TreeMap::new(vec![blob("a")]).unwrap();
        let _ = &map["z"];
    }

    #[test]
    fn positional_access() {
        let map = TreeMap::new(vec![blob("b"), blob("a")]).unwrap();
        assert_eq!(map[0], blob("a"));
        assert_eq!(map.node_at(1).unwrap(), &blob("b"));
        assert_eq!(
            map.node_at(2),
            Err(TreeError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(TreeMap::EMPTY.node_at(0).is_err());
    }

    // -----------------------------------------------------------------------
    // Merge & remove
    // -----------------------------------------------------------------------

    #[test]
    fn merge_node_inserts_or_replaces() {
        let map = TreeMap::new(vec![blob("a"), blob("c")]).unwrap();

        let inserted = map.merge_node(blob("b"));
        assert_eq!(names(&inserted), vec!["a", "b", "c"]);
        assert_eq!(names(&map), vec!["a", "c"]);

        let replaced = map.merge_node(blob_with("a", "new"));
        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced["a"], blob_with("a", "new"));

        assert_eq!(TreeMap::EMPTY.merge_node(blob("x")), TreeMap::new(vec![blob("x")]).unwrap());
    }

    #[test]
    fn merge_entry_validates_name() {
        let r = TreeRef::blob(BlobId::of(b"x"));
        assert!(TreeMap::EMPTY.merge_entry("x", r).is_ok());
        assert!(matches!(
            TreeMap::EMPTY.merge_entry(" ", r),
            Err(TreeError::Type(_))
        ));
    }

    #[test]
    fn merge_is_right_biased() {
        let left = TreeMap::new(vec![blob("a"), blob("b")]).unwrap();
        let right = TreeMap::new(vec![blob_with("b", "right"), blob("c")]).unwrap();
        let merged = left.merge(&right);
        assert_eq!(names(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged["b"], right["b"]);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let map = TreeMap::new(vec![blob("a")]).unwrap();
        assert_eq!(map.merge(&TreeMap::EMPTY), map);
        assert_eq!(TreeMap::EMPTY.merge(&map), map);
        assert_eq!(map.merge(&map), map);
    }

    #[test]
    fn merge_all_canonicalizes_batch() {
        let map = TreeMap::new(vec![blob("b")]).unwrap();
        let merged = map.merge_all(vec![blob("c"), blob("a"), blob("a")]).unwrap();
        assert_eq!(names(&merged), vec!["a", "b", "c"]);
        assert!(map.merge_all(vec![blob("a"), blob_with("a", "x")]).is_err());
    }

    #[test]
    fn remove_then_order_is_kept() {
        let map = TreeMap::new(vec![blob("c"), blob("a"), blob("b")]).unwrap();
        let removed = map.remove("a");
        assert_eq!(removed, TreeMap::new(vec![blob("b"), blob("c")]).unwrap());
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn remove_missing_or_last() {
        let map = TreeMap::new(vec![blob("a")]).unwrap();
        assert_eq!(map.remove("z"), map);
        assert_eq!(map.remove("a"), TreeMap::EMPTY);
        assert_eq!(TreeMap::EMPTY.remove("a"), TreeMap::EMPTY);
    }

    #[test]
    fn remove_where_filters_by_name() {
        let map = TreeMap::new(vec![blob("a1"), blob("b1"), blob("a2")]).unwrap();
        let kept = map.remove_where(|name| name.starts_with('a'));
        assert_eq!(names(&kept), vec!["b1"]);
        assert_eq!(map.remove_where(|_| false), map);
        assert_eq!(map.remove_where(|_| true), TreeMap::EMPTY);
    }

    fn arb_nodes() -> impl Strategy<Value = Vec<TreeMapNode>> {
        proptest::collection::btree_set("[a-z]{1,6}", 0..24).prop_map(|names| {
            names.iter().map(|n| blob(n)).collect()
        })
    }

    proptest! {
        #[test]
        fn iteration_is_strictly_ascending(mut nodes in arb_nodes(), seed in any::<u64>()) {
            // scramble input order
            let len = nodes.len().max(1);
            nodes.rotate_left((seed as usize) % len);
            nodes.reverse();
            let map = TreeMap::new(nodes.clone()).unwrap();
            prop_assert_eq!(map.len(), nodes.len());
            let keys: Vec<&str> = map.keys().collect();
            for pair in keys.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }

        #[test]
        fn merge_is_idempotent(nodes in arb_nodes()) {
            let map = TreeMap::new(nodes).unwrap();
            prop_assert_eq!(map.merge(&map), map);
        }

        #[test]
        fn merge_prefers_argument(left in arb_nodes(), right in arb_nodes()) {
            let left = TreeMap::new(left).unwrap();
            let right = TreeMap::new(right.into_iter().map(|n| blob_with(n.name(), "r"))).unwrap();
            let merged = left.merge(&right);
            for node in &right {
                prop_assert_eq!(&merged[node.name()], node);
            }
            for node in &left {
                prop_assert!(merged.contains_key(node.name()));
            }
        }
    }
}
