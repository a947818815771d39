//! Geometry engine: node coordinates for the visible tree.
//!
//! Layout space puts the breadth axis on `x` and the depth axis on `y`.
//! Screen space swaps them, so trees grow left to right.

pub mod path;
mod tidy;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{GraphError, Result};
use crate::models::{EventTree, NodeId, Point};

pub use path::ConnectorPath;

/// Smallest container dimension accepted by default.
pub const DEFAULT_MIN_DIMENSION: f64 = 1.0;

/// Host-owned container rectangle, read but never resized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    /// A box anchored at the origin.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            top: 0.0,
            left: 0.0,
            right: width,
            bottom: height,
        }
    }

    /// Sets the screen offsets of the container.
    #[must_use]
    pub const fn with_offsets(mut self, top: f64, left: f64, right: f64, bottom: f64) -> Self {
        self.top = top;
        self.left = left;
        self.right = right;
        self.bottom = bottom;
        self
    }
}

/// A point in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    /// Swaps the layout axes and shifts by the left margin.
    #[must_use]
    pub fn project(point: Point, margin_left: f64) -> Self {
        Self {
            x: point.y + margin_left,
            y: point.x,
        }
    }
}

/// Tidy tree layout over a fixed container size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayout {
    width: f64,
    height: f64,
}

impl TreeLayout {
    /// Validates the container size against `min_dimension`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::LayoutPrecondition` if either dimension is not
    /// finite or is below `min_dimension`.
    pub fn new(width: f64, height: f64, min_dimension: f64) -> Result<Self> {
        let usable = |value: f64| value.is_finite() && value >= min_dimension;
        if !usable(width) || !usable(height) {
            return Err(GraphError::LayoutPrecondition {
                width,
                height,
                floor: min_dimension,
            });
        }
        Ok(Self { width, height })
    }

    /// Layout sized to a host container.
    ///
    /// # Errors
    ///
    /// See [`TreeLayout::new`].
    pub fn from_bounds(bounds: &BoundingBox, min_dimension: f64) -> Result<Self> {
        Self::new(bounds.width, bounds.height, min_dimension)
    }

    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Width of one depth band when the deepest visible node is at `max_depth`.
    #[must_use]
    pub fn depth_spacing(&self, max_depth: usize) -> f64 {
        self.width / (max_depth as f64 + 1.0)
    }

    /// Positions every visible node and returns them in pre-order.
    ///
    /// Each node's old position moves to `previous`. On the root's first
    /// layout its `previous` is seeded to the middle of the left edge, so the
    /// first render grows out of a single point.
    pub fn apply(&self, tree: &mut EventTree) -> Vec<NodeId> {
        let root = tree.root();
        let first_pass = tree.node(root).is_some_and(|node| !node.is_laid_out());

        let spacing = self.depth_spacing(tree.max_visible_depth());
        let breadth = tidy::breadth_positions(tree, self.height);

        let mut order = Vec::with_capacity(breadth.len());
        for (id, x) in breadth {
            if let Some(node) = tree.node_mut(id) {
                let position = Point::new(x, node.depth() as f64 * spacing);
                node.place(position);
                trace!(%id, x = position.x, y = position.y, "placed node");
                order.push(id);
            }
        }

        if first_pass {
            if let Some(node) = tree.node_mut(root) {
                node.previous = Point::new(self.height / 2.0, 0.0);
            }
        }

        debug!(
            nodes = order.len(),
            width = self.width,
            height = self.height,
            "laid out tree"
        );
        order
    }
}

/// Lays out the visible tree inside a `width` x `height` container.
///
/// # Errors
///
/// Returns `GraphError::LayoutPrecondition` if the container is smaller than
/// [`DEFAULT_MIN_DIMENSION`] or not finite.
pub fn layout(tree: &mut EventTree, width: f64, height: f64) -> Result<Vec<NodeId>> {
    Ok(TreeLayout::new(width, height, DEFAULT_MIN_DIMENSION)?.apply(tree))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::EventNodeInput;
    use serde_json::json;

    fn input(id: &str, children: Vec<EventNodeInput>) -> EventNodeInput {
        EventNodeInput {
            event: json!({"id": id, "tags": {"source": ["s"], "type": ["t"]}}),
            children,
            collapsed_children: Vec::new(),
        }
    }

    fn sample() -> EventTree {
        EventTree::from_input(vec![input(
            "r",
            vec![input("a", vec![input("a1", vec![])]), input("b", vec![])],
        )])
        .unwrap()
    }

    #[test]
    fn test_depth_axis_bands() {
        let mut tree = sample();
        let order = layout(&mut tree, 900.0, 600.0).unwrap();

        assert_eq!(order.len(), 4);
        for id in order {
            let node = tree.get(id).unwrap();
            assert!((node.position().y - node.depth() as f64 * 300.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_root_previous_seeded_on_first_pass_only() {
        let mut tree = sample();
        layout(&mut tree, 900.0, 600.0).unwrap();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.previous(), Point::new(300.0, 0.0));

        let a = tree.find_by_event_id("a").unwrap();
        tree.toggle(a).unwrap();
        layout(&mut tree, 900.0, 600.0).unwrap();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.previous(), Point::new(300.0, 0.0));
        assert_eq!(root.position(), Point::new(300.0, 0.0));
    }

    #[test]
    fn test_previous_tracks_last_position() {
        let mut tree = sample();
        layout(&mut tree, 900.0, 600.0).unwrap();
        let a = tree.find_by_event_id("a").unwrap();
        let before = tree.get(a).unwrap().position();

        let b = tree.find_by_event_id("b").unwrap();
        layout(&mut tree, 900.0, 300.0).unwrap();
        assert_eq!(tree.get(a).unwrap().previous(), before);
        assert!(tree.get(b).unwrap().position().x <= 300.0);
    }

    #[test]
    fn test_collapsed_subtree_not_positioned() {
        let mut tree = sample();
        let a = tree.find_by_event_id("a").unwrap();
        let a1 = tree.find_by_event_id("a1").unwrap();
        tree.toggle(a).unwrap();

        let order = layout(&mut tree, 900.0, 600.0).unwrap();
        assert_eq!(order.len(), 3);
        assert!(!order.contains(&a1));
        assert!(!tree.get(a1).unwrap().is_laid_out());
        // Max depth drops to 1, so bands widen.
        assert!((tree.get(a).unwrap().position().y - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_degenerate_container() {
        let mut tree = sample();
        assert_eq!(
            layout(&mut tree, 0.0, 600.0),
            Err(GraphError::LayoutPrecondition {
                width: 0.0,
                height: 600.0,
                floor: DEFAULT_MIN_DIMENSION,
            })
        );
        assert!(layout(&mut tree, f64::NAN, 600.0).is_err());
        assert!(layout(&mut tree, 600.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_custom_floor() {
        assert!(TreeLayout::new(10.0, 10.0, 20.0).is_err());
        assert!(TreeLayout::from_bounds(&BoundingBox::new(20.0, 20.0), 20.0).is_ok());
    }

    #[test]
    fn test_projection_swaps_axes() {
        let screen = ScreenPoint::project(Point::new(120.0, 300.0), 50.0);
        assert_eq!(screen, ScreenPoint { x: 350.0, y: 120.0 });
    }
}
