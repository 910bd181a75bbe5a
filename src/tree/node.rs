//! Node key and per-node tree data.
//!
//! Callers identify nodes by an opaque key of their choosing (a string,
//! a small integer, ...). The tree stores one `NodeData` per attached node
//! as the petgraph node weight.

use std::hash::Hash;

/// Marker trait for caller-supplied node identifiers.
///
/// Blanket-implemented for every type that can be cloned, compared for
/// equality, and hashed, so callers never implement it by hand. The WASM
/// surface fixes the key type to `String`.
pub trait NodeKey: Clone + Eq + Hash {}

impl<T: Clone + Eq + Hash> NodeKey for T {}

/// Per-node data stored as the graph node weight.
#[derive(Debug, Clone)]
pub struct NodeData<K> {
    /// The caller-supplied identifier.
    pub key: K,
    /// 1-based depth: the root is at level 1, its children at level 2.
    pub level: u32,
}

impl<K> NodeData<K> {
    /// Create node data for a node at the given level.
    #[inline]
    pub fn new(key: K, level: u32) -> Self {
        Self { key, level }
    }
}
