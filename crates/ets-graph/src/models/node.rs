//! Tree node records stored in the `EventTree` arena.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::event::EventRecord;
use super::tags::EventTags;

/// Index of a node inside its `EventTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Stable identity used as the diff key for scene elements.
///
/// Allocated from a renderer-wide sequence the first time a node is laid out
/// and never reassigned afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderId(u64);

impl RenderId {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position in layout space.
///
/// `x` is the breadth axis (drawn vertically) and `y` the depth axis (drawn
/// horizontally), so the tree grows left to right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// A parent/child edge between two visible nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
}

/// One node of the event tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EventNode {
    pub(crate) event: EventRecord,
    pub(crate) tags: EventTags,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) collapsed_children: Vec<NodeId>,
    pub(crate) depth: usize,
    pub(crate) position: Point,
    pub(crate) previous: Point,
    pub(crate) laid_out: bool,
    pub(crate) render_id: Option<RenderId>,
}

impl EventNode {
    pub(crate) const fn new(
        event: EventRecord,
        tags: EventTags,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Self {
        Self {
            event,
            tags,
            parent,
            children: Vec::new(),
            collapsed_children: Vec::new(),
            depth,
            position: Point::origin(),
            previous: Point::origin(),
            laid_out: false,
            render_id: None,
        }
    }

    #[must_use]
    pub const fn event(&self) -> &EventRecord {
        &self.event
    }

    #[must_use]
    pub const fn tags(&self) -> &EventTags {
        &self.tags
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Visible children, in order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Hidden children, in order.
    #[must_use]
    pub fn collapsed_children(&self) -> &[NodeId] {
        &self.collapsed_children
    }

    /// Distance from the root.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Current layout position.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Position before the last layout pass, used as an animation origin.
    #[must_use]
    pub const fn previous(&self) -> Point {
        self.previous
    }

    /// True once the node has been through at least one layout pass.
    #[must_use]
    pub const fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    #[must_use]
    pub const fn render_id(&self) -> Option<RenderId> {
        self.render_id
    }

    /// True if the node currently hides a non-empty subtree.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        !self.collapsed_children.is_empty()
    }

    /// True if the node has no children in either slot.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.collapsed_children.is_empty()
    }

    /// Swaps the visible and hidden child lists.
    pub(crate) fn toggle(&mut self) {
        std::mem::swap(&mut self.children, &mut self.collapsed_children);
    }

    /// Records a new layout position, keeping the old one as `previous`.
    pub(crate) const fn place(&mut self, position: Point) {
        if self.laid_out {
            self.previous = self.position;
        } else {
            self.previous = position;
        }
        self.position = position;
        self.laid_out = true;
    }
}
