//! Connector curves between parent and child nodes
//!
//! A connector is a cubic Bezier "diagonal": it leaves the parent
//! horizontally, bends halfway along the depth axis and arrives at the child
//! horizontally. Geometry is computed in layout space and projected to screen
//! space, where the depth axis runs left to right.

use serde::{Deserialize, Serialize};

use super::ScreenPoint;
use crate::models::Point;

/// A cubic Bezier connector in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPath {
    /// Start point (parent position)
    pub start: ScreenPoint,
    /// First control point, level with the parent
    pub control_start: ScreenPoint,
    /// Second control point, level with the child
    pub control_end: ScreenPoint,
    /// End point (child position)
    pub end: ScreenPoint,
}

impl ConnectorPath {
    /// Builds the diagonal from `source` to `target`, both in layout space.
    ///
    /// # Examples
    /// ```
    /// # use ets_graph::layout::path::ConnectorPath;
    /// # use ets_graph::models::Point;
    /// let path = ConnectorPath::diagonal(Point::new(100.0, 0.0), Point::new(40.0, 200.0), 0.0);
    /// assert_eq!(path.to_svg_path(), "M0,100C100,100 100,40 200,40");
    /// ```
    #[must_use]
    pub fn diagonal(source: Point, target: Point, margin_left: f64) -> Self {
        let mid_depth = (source.y + target.y) / 2.0;
        Self {
            start: ScreenPoint::project(source, margin_left),
            control_start: ScreenPoint::project(Point::new(source.x, mid_depth), margin_left),
            control_end: ScreenPoint::project(Point::new(target.x, mid_depth), margin_left),
            end: ScreenPoint::project(target, margin_left),
        }
    }

    /// A zero-length connector sitting on a single point.
    ///
    /// Entering links start from this shape and exiting links shrink into it.
    #[must_use]
    pub fn collapsed_at(point: Point, margin_left: f64) -> Self {
        Self::diagonal(point, point, margin_left)
    }

    /// SVG path data: `M start C control_start control_end end`.
    #[must_use]
    pub fn to_svg_path(&self) -> String {
        format!(
            "M{},{}C{},{} {},{} {},{}",
            self.start.x,
            self.start.y,
            self.control_start.x,
            self.control_start.y,
            self.control_end.x,
            self.control_end.y,
            self.end.x,
            self.end.y
        )
    }

    /// True if every point coincides, i.e. nothing would be drawn.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        [self.control_start, self.control_end, self.end]
            .iter()
            .all(|p| (p.x - self.start.x).abs() < f64::EPSILON && (p.y - self.start.y).abs() < f64::EPSILON)
    }

    /// Evaluates the curve at parameter `t`, clamped to `[0, 1]`.
    ///
    /// Formula: B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃
    #[must_use]
    pub fn point_at(&self, t: f64) -> ScreenPoint {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        ScreenPoint {
            x: b0 * self.start.x + b1 * self.control_start.x + b2 * self.control_end.x + b3 * self.end.x,
            y: b0 * self.start.y + b1 * self.control_start.y + b2 * self.control_end.y + b3 * self.end.y,
        }
    }

    /// Samples the curve into `sample_count` points (at least start and end),
    /// for hosts that draw polylines or hit-test connectors.
    #[must_use]
    pub fn sample(&self, sample_count: usize) -> Vec<ScreenPoint> {
        let count = sample_count.max(2);
        let last = (count - 1) as f64;
        (0..count).map(|i| self.point_at(i as f64 / last)).collect()
    }
}
