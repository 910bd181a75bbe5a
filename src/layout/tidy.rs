//! Buchheim-Jünger-Leipert tidy tree layout.
//!
//! Implements the O(n) formulation from "Improving Walker's Algorithm to
//! Run in Linear Time" (Buchheim, Jünger, Leipert, 2002): Walker's
//! aesthetic rules — no overlapping subtrees, parents centered over their
//! children, minimal width, preserved child order — with thread pointers
//! so contours of differing heights are traversed without re-walking
//! subtrees.
//!
//! # Algorithm Overview
//!
//! 1. **First walk (post-order):** assign preliminary x-coordinates bottom
//!    up, merging each subtree's contour against its left siblings
//!    (`apportion`) and recording subtree shifts as modifiers.
//! 2. **Second walk (pre-order):** accumulate modifiers down the tree and
//!    emit final coordinates, seeded with the negated root prelim so the
//!    root lands at x = 0. The y-coordinate is the node's 1-based level.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tree::{NodeKey, Tree};

/// Final coordinate for one node.
///
/// `y` is the 1-based tree level (root = 1); `x` is the horizontal
/// position with the root fixed at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f32,
    pub y: f32,
}

/// Per-node auxiliary state for one layout run.
///
/// One slot per reachable node, created with defaults when the tree is
/// flattened, mutated by both walks, and discarded once the coordinate
/// mapping has been produced. `thread` and `ancestor` are slot indices
/// into the same table (lookup only — ownership stays parent → child).
#[derive(Debug)]
struct Position<K> {
    /// The caller-supplied key, carried through to the output mapping.
    key: K,
    /// Parent slot (None for the root).
    parent: Option<usize>,
    /// Child slots in declaration order.
    children: Vec<usize>,
    /// 1-based level, becomes the y-coordinate.
    level: u32,
    /// 0-based index among siblings, fixed at initialization.
    number: usize,
    /// Preliminary x-coordinate, relative to the node's own subtree.
    prelim: f32,
    /// Accumulated x-shift applied to the whole subtree in the second walk.
    modifier: f32,
    /// Pending shift distributed over siblings by `execute_shifts`.
    shift: f32,
    /// Pending per-gap change distributed over siblings by `execute_shifts`.
    change: f32,
    /// Contour shortcut to the next node when this subtree runs out.
    thread: Option<usize>,
    /// Tie-breaking anchor for contour comparison; starts as the slot itself.
    ancestor: usize,
}

/// The tidy tree layout engine.
///
/// `distance` is the minimum horizontal gap enforced between adjacent
/// subtree edges at every level. It is applied as a pure additive
/// constant, so zero and negative values are accepted and simply collapse
/// the spacing.
pub struct TidyLayout {
    distance: f32,
}

impl TidyLayout {
    /// Create a layout engine with the given sibling distance.
    pub fn new(distance: f32) -> Self {
        Self { distance }
    }

    /// Compute coordinates for every node of the tree.
    ///
    /// Returns one entry per attached node, keyed by the caller's id. The
    /// computation is a pure function of the tree and the distance: no
    /// state survives the call.
    pub fn compute<K: NodeKey>(&self, tree: &Tree<K>) -> HashMap<K, Coord> {
        let mut slots = flatten(tree);
        self.first_walk(0, &mut slots);

        let mut coords = HashMap::with_capacity(slots.len());
        let root_prelim = slots[0].prelim;
        self.second_walk(0, -root_prelim, &slots, &mut coords);
        coords
    }

    /// First walk: post-order assignment of preliminary x-coordinates.
    fn first_walk<K>(&self, v: usize, slots: &mut [Position<K>]) {
        // Clone the child list so the recursion can borrow slots mutably.
        let children = slots[v].children.clone();

        if children.is_empty() {
            slots[v].prelim = match left_sibling(slots, v) {
                Some(w) => slots[w].prelim + self.distance,
                None => 0.0,
            };
            return;
        }

        // Walk children left to right, merging each one's contour against
        // the subtrees already placed. The default ancestor carried across
        // the fold starts at the leftmost child.
        let mut default_ancestor = children[0];
        for (i, &child) in children.iter().enumerate() {
            self.first_walk(child, slots);
            if i > 0 {
                default_ancestor = self.apportion(child, default_ancestor, slots);
            }
        }

        self.execute_shifts(v, slots);

        let midpoint =
            (slots[children[0]].prelim + slots[children[children.len() - 1]].prelim) / 2.0;
        match left_sibling(slots, v) {
            Some(w) => {
                slots[v].prelim = slots[w].prelim + self.distance;
                // The modifier re-centers the subtree under the new prelim
                // during the second walk.
                slots[v].modifier = slots[v].prelim - midpoint;
            }
            None => slots[v].prelim = midpoint,
        }
    }

    /// Apportion: merge the just-walked subtree rooted at `v` against all
    /// previously placed sibling subtrees.
    ///
    /// Walks four contour cursors level by level — inner left (right
    /// contour of the left siblings), inner right (left contour of `v`),
    /// and the two outer contours — each with its own running modifier
    /// sum. Whenever the inner contours would violate the distance, the
    /// subtree anchored at `ancestor(inner_left, v, default)` is shifted
    /// right. After the loop, threads splice the shorter contour onto the
    /// deeper one so later merges traverse it in amortized O(1) per level.
    fn apportion<K>(
        &self,
        v: usize,
        mut default_ancestor: usize,
        slots: &mut [Position<K>],
    ) -> usize {
        let Some(w) = left_sibling(slots, v) else {
            // Leftmost child: nothing to merge against.
            return default_ancestor;
        };

        // Cursors: inner/outer x left/right.
        let mut vil = w;
        let mut vir = v;
        let mut vol = leftmost_sibling(slots, v).unwrap_or(v);
        let mut vor = v;

        // Running modifier sums, one per cursor.
        let mut sil = slots[vil].modifier;
        let mut sir = slots[vir].modifier;
        let mut sol = slots[vol].modifier;
        let mut sor = slots[vor].modifier;

        loop {
            let (Some(next_il), Some(next_ir), Some(next_or)) = (
                next_right(slots, vil),
                next_left(slots, vir),
                next_right(slots, vor),
            ) else {
                break;
            };
            vil = next_il;
            vir = next_ir;
            vor = next_or;
            if let Some(next_ol) = next_left(slots, vol) {
                vol = next_ol;
            }

            // Route later ancestor lookups through the newest merge.
            slots[vor].ancestor = v;

            let shift = (slots[vil].prelim + sil) - (slots[vir].prelim + sir) + self.distance;
            if shift > 0.0 {
                let anchor = ancestor(slots, vil, v, default_ancestor);
                self.move_subtree(anchor, v, shift, slots);
                sir += shift;
                sor += shift;
            }

            sil += slots[vil].modifier;
            sir += slots[vir].modifier;
            sol += slots[vol].modifier;
            sor += slots[vor].modifier;
        }

        // The left contour ran deeper: thread the bottom of v's outer
        // right contour onto it, folding the modifier difference in.
        if let Some(next_il) = next_right(slots, vil) {
            if next_right(slots, vor).is_none() {
                slots[vor].thread = Some(next_il);
                slots[vor].modifier += sil - sor;
            }
        }
        // Mirror: v's subtree ran deeper, thread the outer left contour
        // onto it and make v the new default ancestor.
        if let Some(next_ir) = next_left(slots, vir) {
            if next_left(slots, vol).is_none() {
                slots[vol].thread = Some(next_ir);
                slots[vol].modifier += sir - sol;
                default_ancestor = v;
            }
        }

        default_ancestor
    }

    /// Shift the subtree rooted at `wr` right by `shift`, recording
    /// `change`/`shift` deltas so `execute_shifts` interpolates the move
    /// smoothly across the siblings between `wl` and `wr` instead of
    /// applying it as a single jump.
    fn move_subtree<K>(&self, wl: usize, wr: usize, shift: f32, slots: &mut [Position<K>]) {
        let subtrees = (slots[wr].number as f32 - slots[wl].number as f32).max(1.0);
        slots[wr].change -= shift / subtrees;
        slots[wr].shift += shift;
        slots[wl].change += shift / subtrees;
        slots[wr].prelim += shift;
        slots[wr].modifier += shift;
    }

    /// Resolve the pending shift/change accumulators across the children
    /// of `v`, right to left.
    fn execute_shifts<K>(&self, v: usize, slots: &mut [Position<K>]) {
        let children = slots[v].children.clone();
        let mut shift = 0.0f32;
        let mut change = 0.0f32;

        for &child in children.iter().rev() {
            slots[child].prelim += shift;
            slots[child].modifier += shift;
            change += slots[child].change;
            shift += slots[child].shift + change;
        }
    }

    /// Second walk: pre-order accumulation of modifiers into final
    /// coordinates. Each node's position depends only on the running sum
    /// along its ancestor chain.
    fn second_walk<K: NodeKey>(
        &self,
        v: usize,
        modifier_sum: f32,
        slots: &[Position<K>],
        coords: &mut HashMap<K, Coord>,
    ) {
        coords.insert(
            slots[v].key.clone(),
            Coord {
                x: slots[v].prelim + modifier_sum,
                y: slots[v].level as f32,
            },
        );
        for &child in &slots[v].children {
            self.second_walk(child, modifier_sum + slots[v].modifier, slots, coords);
        }
    }
}

/// Flatten the tree into the position table, slot 0 = root, children
/// discovered depth-first in declaration order.
fn flatten<K: NodeKey>(tree: &Tree<K>) -> Vec<Position<K>> {
    let mut slots = Vec::with_capacity(tree.len());
    visit(tree, tree.root().clone(), None, 0, &mut slots);
    slots
}

fn visit<K: NodeKey>(
    tree: &Tree<K>,
    key: K,
    parent: Option<usize>,
    number: usize,
    slots: &mut Vec<Position<K>>,
) -> usize {
    let slot = slots.len();
    slots.push(Position {
        level: tree.level(&key),
        key: key.clone(),
        parent,
        children: Vec::new(),
        number,
        prelim: 0.0,
        modifier: 0.0,
        shift: 0.0,
        change: 0.0,
        thread: None,
        ancestor: slot,
    });

    let child_keys = tree.children(&key);
    let mut child_slots = Vec::with_capacity(child_keys.len());
    for (number, child_key) in child_keys.into_iter().enumerate() {
        child_slots.push(visit(tree, child_key, Some(slot), number, slots));
    }
    slots[slot].children = child_slots;
    slot
}

// =============================================================================
// Contour accessors
// =============================================================================

/// Next node on the left contour: leftmost child, else the thread.
fn next_left<K>(slots: &[Position<K>], v: usize) -> Option<usize> {
    slots[v].children.first().copied().or(slots[v].thread)
}

/// Next node on the right contour: rightmost child, else the thread.
fn next_right<K>(slots: &[Position<K>], v: usize) -> Option<usize> {
    slots[v].children.last().copied().or(slots[v].thread)
}

/// Immediate predecessor of `v` in sibling order.
fn left_sibling<K>(slots: &[Position<K>], v: usize) -> Option<usize> {
    let parent = slots[v].parent?;
    let number = slots[v].number;
    if number == 0 {
        return None;
    }
    Some(slots[parent].children[number - 1])
}

/// First child of `v`'s parent. Only queried when `v` has a left sibling,
/// so this is never `v` itself.
fn leftmost_sibling<K>(slots: &[Position<K>], v: usize) -> Option<usize> {
    let parent = slots[v].parent?;
    slots[parent].children.first().copied()
}

/// The anchor subtree to shift against: `vil`'s recorded ancestor when it
/// is still a sibling of `v` under the current, possibly-shifted state,
/// otherwise the default ancestor carried through the fold.
fn ancestor<K>(slots: &[Position<K>], vil: usize, v: usize, default_ancestor: usize) -> usize {
    let candidate = slots[vil].ancestor;
    let siblings = candidate != v
        && match (slots[candidate].parent, slots[v].parent) {
            (Some(pa), Some(pb)) => pa == pb,
            _ => false,
        };
    if siblings { candidate } else { default_ancestor }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(shape: &[(&str, Option<&str>)]) -> Tree<String> {
        let pairs: Vec<(String, Option<String>)> = shape
            .iter()
            .map(|(k, p)| (k.to_string(), p.map(|p| p.to_string())))
            .collect();
        Tree::from_pairs(&pairs).unwrap()
    }

    fn layout(distance: f32, shape: &[(&str, Option<&str>)]) -> HashMap<String, Coord> {
        TidyLayout::new(distance).compute(&build(shape))
    }

    fn assert_at(coords: &HashMap<String, Coord>, key: &str, x: f32, y: f32) {
        let c = coords
            .get(key)
            .unwrap_or_else(|| panic!("no coordinate for {key}"));
        assert!(
            (c.x - x).abs() < 1e-4 && (c.y - y).abs() < 1e-4,
            "{key}: expected ({x}, {y}), got ({}, {})",
            c.x,
            c.y
        );
    }

    #[test]
    fn test_single_node() {
        for distance in [0.0, 1.0, 7.5] {
            let coords = layout(distance, &[("root", None)]);
            assert_eq!(coords.len(), 1);
            assert_at(&coords, "root", 0.0, 1.0);
        }
    }

    #[test]
    fn test_two_children_distance_one() {
        // Scenario A.
        let coords = layout(1.0, &[("a", None), ("b", Some("a")), ("c", Some("a"))]);
        assert_eq!(coords.len(), 3);
        assert_at(&coords, "a", 0.0, 1.0);
        assert_at(&coords, "b", -0.5, 2.0);
        assert_at(&coords, "c", 0.5, 2.0);
    }

    #[test]
    fn test_two_children_distance_two() {
        // Scenario B: same shape, doubled spacing.
        let coords = layout(2.0, &[("a", None), ("b", Some("a")), ("c", Some("a"))]);
        assert_at(&coords, "a", 0.0, 1.0);
        assert_at(&coords, "b", -1.0, 2.0);
        assert_at(&coords, "c", 1.0, 2.0);
    }

    fn twelve_node_shape() -> Vec<(&'static str, Option<&'static str>)> {
        // a
        // ├── b
        // │   ├── d
        // │   │   ├── f
        // │   │   ├── g
        // │   │   ├── h
        // │   │   │   ├── j
        // │   │   │   └── k
        // │   │   └── i
        // │   └── e
        // └── c
        //     └── l
        vec![
            ("a", None),
            ("b", Some("a")),
            ("c", Some("a")),
            ("d", Some("b")),
            ("e", Some("b")),
            ("f", Some("d")),
            ("g", Some("d")),
            ("h", Some("d")),
            ("i", Some("d")),
            ("j", Some("h")),
            ("k", Some("h")),
            ("l", Some("c")),
        ]
    }

    #[test]
    fn test_twelve_node_regression() {
        // Canonical regression: exercises contour threading (the leaf "e"
        // gets threaded onto d's right contour, and "l" onto e's) and the
        // shift distributed between "b" and "c" at the root.
        let coords = layout(2.0, &twelve_node_shape());
        assert_eq!(coords.len(), 12);
        assert_at(&coords, "a", 0.0, 1.0);
        assert_at(&coords, "b", -1.5, 2.0);
        assert_at(&coords, "c", 1.5, 2.0);
        assert_at(&coords, "d", -2.5, 3.0);
        assert_at(&coords, "e", -0.5, 3.0);
        assert_at(&coords, "f", -5.5, 4.0);
        assert_at(&coords, "g", -3.5, 4.0);
        assert_at(&coords, "h", -1.5, 4.0);
        assert_at(&coords, "i", 0.5, 4.0);
        assert_at(&coords, "j", -2.5, 5.0);
        assert_at(&coords, "k", -0.5, 5.0);
        assert_at(&coords, "l", 1.5, 3.0);
    }

    #[test]
    fn test_chain_stays_on_axis() {
        let coords = layout(
            3.0,
            &[("a", None), ("b", Some("a")), ("c", Some("b")), ("d", Some("c"))],
        );
        for (key, level) in [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)] {
            assert_at(&coords, key, 0.0, level);
        }
    }

    #[test]
    fn test_zero_distance_collapses_spacing() {
        let coords = layout(0.0, &[("a", None), ("b", Some("a")), ("c", Some("a"))]);
        assert_at(&coords, "a", 0.0, 1.0);
        assert_at(&coords, "b", 0.0, 2.0);
        assert_at(&coords, "c", 0.0, 2.0);
    }

    #[test]
    fn test_negative_distance_accepted() {
        // Not validated: negative spacing simply inverts the sibling order
        // on the axis. Root still ends at 0.
        let coords = layout(-1.0, &[("a", None), ("b", Some("a")), ("c", Some("a"))]);
        assert_at(&coords, "a", 0.0, 1.0);
        assert_at(&coords, "b", 0.5, 2.0);
        assert_at(&coords, "c", -0.5, 2.0);
    }

    #[test]
    fn test_idempotent() {
        let shape = twelve_node_shape();
        let first = layout(2.0, &shape);
        let second = layout(2.0, &shape);
        assert_eq!(first, second, "pure function: identical runs must agree bit for bit");
    }

    /// Check the aesthetic invariants on an arbitrary tree: root at x = 0,
    /// y = level, sibling gaps at least `distance` at every depth, every
    /// parent centered over its first and last child.
    fn assert_invariants(tree: &Tree<String>, distance: f32, coords: &HashMap<String, Coord>) {
        assert_eq!(coords.len(), tree.len());
        assert!(coords[tree.root()].x.abs() < 1e-4, "root must sit at x = 0");

        for key in tree.keys() {
            let c = coords[key];
            assert!(
                (c.y - tree.level(key) as f32).abs() < 1e-4,
                "{key}: y must equal the 1-based level"
            );

            let children = tree.children(key);
            if children.is_empty() {
                continue;
            }
            for pair in children.windows(2) {
                let gap = coords[&pair[1]].x - coords[&pair[0]].x;
                assert!(
                    gap >= distance - 1e-4,
                    "gap between {} and {} is {gap}, expected at least {distance}",
                    pair[0],
                    pair[1]
                );
            }
            let first = coords[&children[0]].x;
            let last = coords[&children[children.len() - 1]].x;
            assert!(
                (c.x - (first + last) / 2.0).abs() < 1e-3,
                "{key}: x = {} but children span [{first}, {last}]",
                c.x
            );
        }
    }

    #[test]
    fn test_invariants_twelve_node() {
        let tree = build(&twelve_node_shape());
        for distance in [0.5, 1.0, 2.0, 10.0] {
            let coords = TidyLayout::new(distance).compute(&tree);
            assert_invariants(&tree, distance, &coords);
        }
    }

    #[test]
    fn test_invariants_lopsided_tree() {
        // A deep left arm next to a wide shallow right arm: forces the
        // contour loop through several thread hops.
        let tree = build(&[
            ("r", None),
            ("a", Some("r")),
            ("b", Some("r")),
            ("c", Some("r")),
            ("a1", Some("a")),
            ("a2", Some("a1")),
            ("a3", Some("a2")),
            ("a4", Some("a3")),
            ("b1", Some("b")),
            ("b2", Some("b")),
            ("b3", Some("b")),
            ("b4", Some("b")),
            ("b5", Some("b")),
            ("c1", Some("c")),
            ("c2", Some("c")),
        ]);
        let coords = TidyLayout::new(1.0).compute(&tree);
        assert_invariants(&tree, 1.0, &coords);
    }

    #[test]
    fn test_invariants_generated_tree() {
        // ~120 nodes with a varying branch factor, mirroring the kind of
        // hierarchies the visualization side feeds in.
        let mut shape: Vec<(String, Option<String>)> = vec![("n0".to_string(), None)];
        let mut next = 1usize;
        let mut frontier = vec![0usize];
        while next < 120 {
            let mut grown = Vec::new();
            for &parent in &frontier {
                let fanout = match parent % 4 {
                    0 => 4,
                    1 => 2,
                    2 => 1,
                    _ => 0,
                };
                for _ in 0..fanout {
                    if next >= 120 {
                        break;
                    }
                    shape.push((format!("n{next}"), Some(format!("n{parent}"))));
                    grown.push(next);
                    next += 1;
                }
            }
            if grown.is_empty() {
                break;
            }
            frontier = grown;
        }

        let tree = Tree::from_pairs(&shape).unwrap();
        let coords = TidyLayout::new(2.0).compute(&tree);
        assert_invariants(&tree, 2.0, &coords);
    }
}
