//! Tree query surface.
//!
//! Thin, read-only helpers over the built tree: children, sibling
//! relations, and level lookups. Unknown ids never fail — they answer
//! with an empty sequence, `None`, or level 0, since only user-facing
//! queries can be handed an id the tree has never seen.

use super::builder::Tree;
use super::node::NodeKey;

impl<K: NodeKey> Tree<K> {
    /// Children of a node, in declaration order. Empty for leaves and for
    /// ids not in the tree.
    pub fn children(&self, key: &K) -> Vec<K> {
        let Some(node) = self.lookup(key) else {
            return Vec::new();
        };
        self.child_indices(node)
            .into_iter()
            .map(|child| self.graph()[child].key.clone())
            .collect()
    }

    /// All nodes sharing `key`'s parent, excluding `key` itself, in order.
    /// Empty for the root and for unknown ids.
    pub fn siblings(&self, key: &K) -> Vec<K> {
        let Some(node) = self.lookup(key) else {
            return Vec::new();
        };
        let Some(parent) = self.parent_index(node) else {
            return Vec::new();
        };
        self.child_indices(parent)
            .into_iter()
            .filter(|&child| child != node)
            .map(|child| self.graph()[child].key.clone())
            .collect()
    }

    /// The immediate predecessor of `key` in sibling order, or `None` when
    /// `key` is a leftmost child, the root, or unknown.
    pub fn left_sibling(&self, key: &K) -> Option<K> {
        let node = self.lookup(key)?;
        let parent = self.parent_index(node)?;
        let children = self.child_indices(parent);
        let position = children.iter().position(|&child| child == node)?;
        if position == 0 {
            return None;
        }
        Some(self.graph()[children[position - 1]].key.clone())
    }

    /// The first of `key`'s siblings in order, or `None` when `key` has no
    /// siblings at all (the root, an only child, or an unknown id). The
    /// node itself is excluded, so a first child with siblings gets its
    /// first *other* sibling.
    pub fn leftmost_sibling(&self, key: &K) -> Option<K> {
        self.siblings(key).into_iter().next()
    }

    /// True iff `a` and `b` are both in the tree and share a parent.
    /// A node is never its own sibling.
    pub fn are_siblings(&self, a: &K, b: &K) -> bool {
        let (Some(a), Some(b)) = (self.lookup(a), self.lookup(b)) else {
            return false;
        };
        if a == b {
            return false;
        }
        match (self.parent_index(a), self.parent_index(b)) {
            (Some(pa), Some(pb)) => pa == pb,
            _ => false,
        }
    }

    /// 1-based depth of a node: the root is 1, its children 2, and so on.
    /// 0 for ids not in the tree.
    pub fn level(&self, key: &K) -> u32 {
        self.lookup(key)
            .map(|node| self.graph()[node].level)
            .unwrap_or(0)
    }
}
