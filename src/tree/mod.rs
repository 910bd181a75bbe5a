//! Rooted ordered tree: construction and queries.
//!
//! The tree is built once per layout run from a flat (id, parent-id) list
//! and stays immutable while the layout engine reads it. Topology lives in
//! petgraph's StableGraph with a key → index side map.

pub mod builder;
pub mod node;
pub mod query;

pub use builder::Tree;
pub use node::{NodeData, NodeKey};
