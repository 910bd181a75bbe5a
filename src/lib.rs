//! Tidytree - WASM Module
//!
//! Linear-time tidy tree layout: given a flat list of (id, parent-id)
//! pairs describing a rooted ordered tree, compute an (x, y) coordinate
//! for every node so a renderer can draw the tree without overlapping
//! subtrees, with parents centered over their children and minimal total
//! width. The algorithm is the Buchheim/Jünger/Leipert linear-time
//! formulation of Walker's aesthetic rules.
//!
//! The crate compiles to WebAssembly for browser frontends and exposes a
//! JavaScript-friendly API via wasm-bindgen; the same code is usable as a
//! plain Rust library through [`tree_layout`].
//!
//! # Architecture
//!
//! - `tree`: rooted ordered tree built on petgraph's StableGraph, with the
//!   children/siblings/level query surface
//! - `layout`: the layout engine (first walk, contour apportionment,
//!   second walk)

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod layout;
pub mod tree;

pub use layout::{Coord, TidyLayout};
pub use tree::{NodeKey, Tree};

use std::collections::HashMap;

/// Compute a tidy tree layout from a flat node list.
///
/// `distance` is the minimum horizontal gap between adjacent subtree
/// edges; `pairs` lists every node as (id, optional parent-id) with the
/// root first. Returns one coordinate per node that attached to the tree,
/// or an empty mapping when the list is empty or the root is misplaced.
pub fn tree_layout<K: NodeKey>(distance: f32, pairs: &[(K, Option<K>)]) -> HashMap<K, Coord> {
    match Tree::from_pairs(pairs) {
        Some(tree) => TidyLayout::new(distance).compute(&tree),
        None => HashMap::new(),
    }
}

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Sentinel position for nodes that did not attach to the tree.
///
/// Matches the convention of the GPU-facing buffers on the JS side, which
/// treat `pos >= SENTINEL` as "skip this slot".
const SENTINEL: f32 = 3.402_823e+38;

/// One-shot layout entry point for JavaScript.
///
/// `nodes` is an array of `[id, parentOrNull]` pairs with the root first;
/// the result is an object mapping each attached id to `{x, y}`. Malformed
/// lists (empty, or a first entry that has a parent) produce an empty
/// object, never an exception.
#[wasm_bindgen(js_name = layoutTree)]
pub fn layout_tree(distance: f32, nodes: JsValue) -> Result<JsValue, JsValue> {
    let pairs: Vec<(String, Option<String>)> = serde_wasm_bindgen::from_value(nodes)?;
    let coords = tree_layout(distance, &pairs);
    Ok(to_js_object(&coords)?)
}

/// Serialize an id-keyed mapping as a plain JS object (the default map
/// serialization would produce a JS `Map`).
fn to_js_object(coords: &HashMap<String, Coord>) -> Result<JsValue, serde_wasm_bindgen::Error> {
    coords.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// Incremental layout builder exposed to JavaScript.
///
/// Collects (id, parent) pairs, then computes the layout on demand. The
/// pair list is kept in insertion order, which is also the sibling order
/// of the resulting tree and the slot order of [`compute_flat`].
///
/// [`compute_flat`]: TidyTreeWasm::compute_flat
#[wasm_bindgen]
pub struct TidyTreeWasm {
    distance: f32,
    pairs: Vec<(String, Option<String>)>,
}

#[wasm_bindgen]
impl TidyTreeWasm {
    /// Create a builder with the given sibling distance.
    #[wasm_bindgen(constructor)]
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            pairs: Vec::new(),
        }
    }

    /// Append a node. The first node added must be the root (no parent).
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, id: String, parent: Option<String>) {
        self.pairs.push((id, parent));
    }

    /// Number of nodes added so far (attached or not).
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.pairs.len() as u32
    }

    /// Update the sibling distance used by subsequent computations.
    #[wasm_bindgen(js_name = setDistance)]
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }

    /// Remove all nodes, resetting the builder.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Compute the layout, returning an object mapping each attached id
    /// to `{x, y}`. Empty object for malformed input.
    pub fn compute(&self) -> Result<JsValue, JsValue> {
        let coords = tree_layout(self.distance, &self.pairs);
        Ok(to_js_object(&coords)?)
    }

    /// Compute the layout as a flat `Float32Array` of `[x0, y0, x1, y1,
    /// ...]` in node insertion order, for direct buffer upload.
    ///
    /// Entries that did not attach to the tree get the sentinel position.
    /// When the whole input is rejected (misplaced root), a console
    /// warning is emitted and every slot is the sentinel.
    #[wasm_bindgen(js_name = computeFlat)]
    pub fn compute_flat(&self) -> Float32Array {
        let coords = tree_layout(self.distance, &self.pairs);
        if coords.is_empty() && !self.pairs.is_empty() {
            web_sys::console::warn_1(
                &"tidytree: input has no valid root; returning sentinel positions".into(),
            );
        }

        let mut positions = Vec::with_capacity(self.pairs.len() * 2);
        for (id, _) in &self.pairs {
            match coords.get(id) {
                Some(c) => {
                    positions.push(c.x);
                    positions.push(c.y);
                }
                None => {
                    positions.push(SENTINEL);
                    positions.push(SENTINEL);
                }
            }
        }
        Float32Array::from(&positions[..])
    }
}

impl Default for TidyTreeWasm {
    fn default() -> Self {
        Self::new(1.0)
    }
}
