//! Helpers for maps that may be absent, such as the root tree of a commit
//! that has none.

use cairn_types::{NodeKind, TreeMapNode, TreeRef};

use crate::error::TreeResult;
use crate::map::TreeMap;

/// Map operations lifted over `Option<TreeMap>`.
///
/// An absent map behaves like [`TreeMap::EMPTY`] for lookups; merging with an
/// absent operand yields the other operand unchanged.
pub trait OptionalTreeMap {
    fn merge_map(&self, other: Option<&TreeMap>) -> Option<TreeMap>;

    fn merge_node(&self, node: TreeMapNode) -> TreeMap;

    fn merge_entry(&self, name: impl Into<String>, tree_ref: TreeRef) -> TreeResult<TreeMap>;

    /// Canonicalize `nodes` and merge them in; an absent map yields just the batch.
    fn merge_all<I>(&self, nodes: I) -> TreeResult<TreeMap>
    where
        I: IntoIterator<Item = TreeMapNode>;

    fn try_get(&self, name: &str) -> Option<&TreeMapNode>;

    fn try_get_kind(&self, name: &str, kind: NodeKind) -> Option<&TreeMapNode>;
}

impl OptionalTreeMap for Option<TreeMap> {
    fn merge_map(&self, other: Option<&TreeMap>) -> Option<TreeMap> {
        match (self, other) {
            (None, None) => None,
            (Some(first), None) => Some(first.clone()),
            (None, Some(second)) => Some(second.clone()),
            (Some(first), Some(second)) => Some(first.merge(second)),
        }
    }

    fn merge_node(&self, node: TreeMapNode) -> TreeMap {
        match self {
            Some(map) => map.merge_node(node),
            None => TreeMap::EMPTY.merge_node(node),
        }
    }

    fn merge_entry(&self, name: impl Into<String>, tree_ref: TreeRef) -> TreeResult<TreeMap> {
        Ok(self.merge_node(TreeMapNode::new(name, tree_ref)?))
    }

    fn merge_all<I>(&self, nodes: I) -> TreeResult<TreeMap>
    where
        I: IntoIterator<Item = TreeMapNode>,
    {
        match self {
            Some(map) => map.merge_all(nodes),
            None => TreeMap::new(nodes),
        }
    }

    fn try_get(&self, name: &str) -> Option<&TreeMapNode> {
        self.as_ref().and_then(|map| map.try_get(name))
    }

    fn try_get_kind(&self, name: &str, kind: NodeKind) -> Option<&TreeMapNode> {
        self.as_ref().and_then(|map| map.try_get_kind(name, kind))
    }
}
