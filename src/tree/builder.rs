//! Tree construction from a flat (id, parent-id) list.
//!
//! The builder turns the caller's flat node list into a rooted, ordered
//! tree. Topology lives in petgraph's StableGraph (parent → child edges);
//! a side map resolves caller keys to graph indices. Malformed input is
//! never an error: an empty list or a misplaced root yields no tree, and
//! entries that cannot be attached are silently dropped.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::node::{NodeData, NodeKey};

/// A rooted, ordered tree over caller-supplied node keys.
///
/// Built once per layout run from the flat input list and immutable
/// afterwards: the layout engine only reads it.
pub struct Tree<K: NodeKey> {
    /// Parent → child topology. Node weights carry the key and level.
    graph: StableGraph<NodeData<K>, (), Directed>,

    /// Map from caller key to graph index.
    index: HashMap<K, NodeIndex>,

    /// The root node (first input entry, no parent).
    root: NodeIndex,
}

impl<K: NodeKey> Tree<K> {
    /// Build a tree from a flat list of (id, optional parent-id) pairs.
    ///
    /// The first entry must be the root (no parent); otherwise, and for an
    /// empty list, no tree is produced. Later entries attach to their
    /// parent in list order; the parent may itself be declared anywhere in
    /// the list, so attachment sweeps the remaining entries until a pass
    /// makes no progress. Entries that never find a parent, entries naming
    /// themselves as parent, extra parentless entries, and duplicate ids
    /// (first occurrence wins) are dropped.
    ///
    /// Sibling order is the relative declaration order of the input list.
    pub fn from_pairs(pairs: &[(K, Option<K>)]) -> Option<Self> {
        let (root_key, root_parent) = pairs.first()?;
        if root_parent.is_some() {
            return None;
        }

        let mut graph = StableGraph::with_capacity(pairs.len(), pairs.len().saturating_sub(1));
        let mut index = HashMap::with_capacity(pairs.len());

        let root = graph.add_node(NodeData::new(root_key.clone(), 1));
        index.insert(root_key.clone(), root);

        let mut pending: Vec<&(K, Option<K>)> = pairs[1..].iter().collect();
        loop {
            let before = pending.len();
            pending.retain(|(key, parent)| {
                if index.contains_key(key) {
                    // Duplicate id: the earlier occurrence wins.
                    return false;
                }
                let Some(parent_key) = parent else {
                    // A second parentless entry can never attach.
                    return false;
                };
                let Some(&parent_index) = index.get(parent_key) else {
                    // Parent not seen yet; retry on the next sweep.
                    return true;
                };
                let level = graph[parent_index].level + 1;
                let child_index = graph.add_node(NodeData::new(key.clone(), level));
                graph.add_edge(parent_index, child_index, ());
                index.insert(key.clone(), child_index);
                false
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        Some(Self { graph, index, root })
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True when the tree holds no nodes. Unreachable through
    /// `from_pairs`, which always attaches at least the root.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether the given id was attached to the tree.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// The root node's key.
    pub fn root(&self) -> &K {
        &self.graph[self.root].key
    }

    /// All attached keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    // =========================================================================
    // Internal index-level accessors (shared with the query surface)
    // =========================================================================

    pub(super) fn graph(&self) -> &StableGraph<NodeData<K>, (), Directed> {
        &self.graph
    }

    pub(super) fn root_index(&self) -> NodeIndex {
        self.root
    }

    pub(super) fn lookup(&self, key: &K) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    /// Children of a node, in declaration order.
    ///
    /// petgraph walks out-neighbors newest-first, so the collected walk is
    /// reversed to restore insertion order.
    pub(super) fn child_indices(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    /// The parent of a node, if any.
    pub(super) fn parent_index(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
    }
}
