//! Breadth-axis placement using the Buchheim–Jünger–Leipert tidy tree algorithm.
//!
//! Linear-time variant of Walker's algorithm: subtrees never overlap, parents
//! sit centred over their first and last child, and identical trees always
//! get identical coordinates.
//!
//! 1. **First walk (post-order):** preliminary coordinates and modifiers,
//!    merging subtree contours through threads.
//! 2. **Second walk (pre-order):** accumulate modifiers into final positions.
//! 3. **Normalise:** scale the extent into `[0, breadth]`, leaving half a
//!    separation unit of padding on each side.

use std::collections::HashMap;

use crate::models::{EventTree, NodeId};

/// Gap between siblings, in layout units.
const SIBLING_SEPARATION: f64 = 1.0;

/// Gap between nodes with different parents, in layout units.
const COUSIN_SEPARATION: f64 = 2.0;

#[derive(Debug)]
struct TidyNode {
    id: NodeId,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Index among siblings.
    number: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor for this node's children during apportion.
    default_ancestor: Option<usize>,
    x: f64,
}

/// Working state for one layout pass over the visible tree.
#[derive(Debug)]
struct Tidy {
    nodes: Vec<TidyNode>,
}

/// Breadth coordinates for every visible node, pre-order, scaled into `[0, breadth]`.
pub(crate) fn breadth_positions(tree: &EventTree, breadth: f64) -> Vec<(NodeId, f64)> {
    let mut tidy = Tidy::build(tree);
    if tidy.nodes.is_empty() {
        return Vec::new();
    }

    for v in tidy.post_order() {
        tidy.first_walk(v);
    }
    tidy.second_walk();
    tidy.normalize(breadth);

    tidy.nodes.iter().map(|node| (node.id, node.x)).collect()
}

impl Tidy {
    fn build(tree: &EventTree) -> Self {
        let order = tree.visible_nodes();
        let index: HashMap<NodeId, usize> = order
            .iter()
            .enumerate()
            .map(|(slot, id)| (*id, slot))
            .collect();

        let nodes = order
            .iter()
            .enumerate()
            .map(|(slot, &id)| {
                let node = tree.node(id);
                let parent = node
                    .and_then(|n| n.parent())
                    .and_then(|p| index.get(&p).copied());
                let children: Vec<usize> = node
                    .map(|n| {
                        n.children()
                            .iter()
                            .filter_map(|c| index.get(c).copied())
                            .collect()
                    })
                    .unwrap_or_default();
                let number = parent
                    .and_then(|p| tree.node(order[p]))
                    .and_then(|p| p.children().iter().position(|c| *c == id))
                    .unwrap_or(0);
                TidyNode {
                    id,
                    parent,
                    children,
                    number,
                    prelim: 0.0,
                    modifier: 0.0,
                    change: 0.0,
                    shift: 0.0,
                    thread: None,
                    ancestor: slot,
                    default_ancestor: None,
                    x: 0.0,
                }
            })
            .collect();

        Self { nodes }
    }

    /// Children left to right, then the parent.
    fn post_order(&self) -> Vec<usize> {
        let mut stack = vec![0];
        let mut visited = Vec::with_capacity(self.nodes.len());
        while let Some(v) = stack.pop() {
            visited.push(v);
            stack.extend(self.nodes[v].children.iter().copied());
        }
        visited.reverse();
        visited
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            SIBLING_SEPARATION
        } else {
            COUSIN_SEPARATION
        }
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        let parent = node.parent?;
        let number = node.number.checked_sub(1)?;
        self.nodes[parent].children.get(number).copied()
    }

    fn leftmost_sibling(&self, v: usize) -> usize {
        self.nodes[v]
            .parent
            .and_then(|p| self.nodes[p].children.first().copied())
            .unwrap_or(v)
    }

    /// Next node on the left contour.
    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v]
            .children
            .first()
            .copied()
            .or(self.nodes[v].thread)
    }

    /// Next node on the right contour.
    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v]
            .children
            .last()
            .copied()
            .or(self.nodes[v].thread)
    }

    fn first_walk(&mut self, v: usize) {
        let left = self.left_sibling(v);
        let first = self.nodes[v].children.first().copied();
        let last = self.nodes[v].children.last().copied();

        if let (Some(first), Some(last)) = (first, last) {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            if let Some(w) = left {
                self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
            } else {
                self.nodes[v].prelim = midpoint;
            }
        } else if let Some(w) = left {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        if let Some(parent) = self.nodes[v].parent {
            let ancestor = self.nodes[parent]
                .default_ancestor
                .unwrap_or_else(|| self.leftmost_sibling(v));
            let ancestor = self.apportion(v, left, ancestor);
            self.nodes[parent].default_ancestor = Some(ancestor);
        }
    }

    fn apportion(&mut self, v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left else {
            return ancestor;
        };

        let mut inner_right = v;
        let mut outer_right = v;
        let mut inner_left = w;
        let mut outer_left = self.leftmost_sibling(v);

        let mut s_inner_right = self.nodes[inner_right].modifier;
        let mut s_outer_right = self.nodes[outer_right].modifier;
        let mut s_inner_left = self.nodes[inner_left].modifier;
        let mut s_outer_left = self.nodes[outer_left].modifier;

        let (next_inner_left, next_inner_right) = loop {
            let next_il = self.next_right(inner_left);
            let next_ir = self.next_left(inner_right);
            let (Some(il), Some(ir)) = (next_il, next_ir) else {
                break (next_il, next_ir);
            };
            inner_left = il;
            inner_right = ir;
            outer_left = self.next_left(outer_left).unwrap_or(outer_left);
            outer_right = self.next_right(outer_right).unwrap_or(outer_right);
            self.nodes[outer_right].ancestor = v;

            let shift = self.nodes[inner_left].prelim + s_inner_left
                - self.nodes[inner_right].prelim
                - s_inner_right
                + self.separation(inner_left, inner_right);
            if shift > 0.0 {
                let candidate = self.nodes[inner_left].ancestor;
                let from = if self.nodes[candidate].parent == self.nodes[v].parent {
                    candidate
                } else {
                    ancestor
                };
                self.move_subtree(from, v, shift);
                s_inner_right += shift;
                s_outer_right += shift;
            }

            s_inner_left += self.nodes[inner_left].modifier;
            s_inner_right += self.nodes[inner_right].modifier;
            s_outer_left += self.nodes[outer_left].modifier;
            s_outer_right += self.nodes[outer_right].modifier;
        };

        if let Some(il) = next_inner_left {
            if self.next_right(outer_right).is_none() {
                self.nodes[outer_right].thread = Some(il);
                self.nodes[outer_right].modifier += s_inner_left - s_outer_right;
            }
        }
        if let Some(ir) = next_inner_right {
            if self.next_left(outer_left).is_none() {
                self.nodes[outer_left].thread = Some(ir);
                self.nodes[outer_left].modifier += s_inner_right - s_outer_left;
                ancestor = v;
            }
        }

        ancestor
    }

    fn move_subtree(&mut self, from: usize, to: usize, shift: f64) {
        let subtrees = self.nodes[to]
            .number
            .saturating_sub(self.nodes[from].number)
            .max(1);
        let change = shift / subtrees as f64;

        self.nodes[to].change -= change;
        self.nodes[to].shift += shift;
        self.nodes[from].change += change;
        self.nodes[to].prelim += shift;
        self.nodes[to].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let children = self.nodes[v].children.clone();
        let mut shift = 0.0;
        let mut change = 0.0;
        for &child in children.iter().rev() {
            let node = &mut self.nodes[child];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    /// Pre-order: slot order is already pre-order, so parents come first.
    fn second_walk(&mut self) {
        // The root behaves as the only child of a virtual parent whose
        // modifier cancels the root's own preliminary coordinate.
        let root_offset = -self.nodes[0].prelim;
        for v in 0..self.nodes.len() {
            let parent_modifier = self.nodes[v]
                .parent
                .map_or(root_offset, |p| self.nodes[p].modifier);
            let node = &mut self.nodes[v];
            node.x = node.prelim + parent_modifier;
            node.modifier += parent_modifier;
        }
    }

    fn normalize(&mut self, breadth: f64) {
        let mut left = 0;
        let mut right = 0;
        for (slot, node) in self.nodes.iter().enumerate() {
            if node.x < self.nodes[left].x {
                left = slot;
            }
            if node.x > self.nodes[right].x {
                right = slot;
            }
        }

        let tx = self.separation(left, right) / 2.0 - self.nodes[left].x;
        let extent = self.nodes[right].x + self.separation(right, left) / 2.0 + tx;
        let kx = breadth / extent;
        for node in &mut self.nodes {
            node.x = (node.x + tx) * kx;
        }
    }
}
