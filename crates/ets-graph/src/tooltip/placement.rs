//! Tooltip anchor direction.
//!
//! Node coordinates arrive in layout space, where `x` runs down the page and
//! `y` runs across it, so "above" compares `x` against the container top and
//! "left" compares `y` against the container left edge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::BoundingBox;
use crate::models::Point;

/// Side of the node the tooltip is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    N,
    S,
    E,
    W,
    Se,
    Sw,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::W => "w",
            Self::Se => "se",
            Self::Sw => "sw",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen edges of the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl From<&BoundingBox> for ContainerRect {
    fn from(bounds: &BoundingBox) -> Self {
        Self {
            top: bounds.top,
            left: bounds.left,
            right: bounds.right,
            bottom: bounds.bottom,
        }
    }
}

/// Measured size of the rendered tooltip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TooltipSize {
    pub width: f64,
    pub height: f64,
}

impl TooltipSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Picks the direction that keeps the tooltip inside the container.
///
/// Rules, first match wins:
/// 1. no room above, room on both sides: `s`
/// 2. no room on the left, room above or below: `e`
/// 3. no room on the right, room above or below: `w`
/// 4. no room above or on the left: `se`
/// 5. no room above or on the right: `sw`
/// 6. otherwise `n`
#[must_use]
pub fn choose_direction(node: Point, container: &ContainerRect, tooltip: TooltipSize) -> Direction {
    let half_width = tooltip.width / 2.0;
    let fits_top = node.x - container.top > tooltip.height;
    let fits_left = node.y - container.left > half_width;
    let fits_right = container.right - node.y > half_width;
    let fits_bottom = node.x - container.bottom > tooltip.height;

    if !fits_top && fits_left && fits_right {
        Direction::S
    } else if !fits_left && (fits_top || fits_bottom) {
        Direction::E
    } else if !fits_right && (fits_top || fits_bottom) {
        Direction::W
    } else if !fits_top && !fits_left {
        Direction::Se
    } else if !fits_top && !fits_right {
        Direction::Sw
    } else {
        Direction::N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ContainerRect {
        ContainerRect {
            top: 0.0,
            left: 0.0,
            right: 1000.0,
            bottom: 600.0,
        }
    }

    #[test]
    fn test_room_everywhere_is_north() {
        let direction = choose_direction(Point::new(300.0, 500.0), &rect(), TooltipSize::new(200.0, 100.0));
        assert_eq!(direction, Direction::N);
    }

    #[test]
    fn test_near_top_is_south() {
        let direction = choose_direction(Point::new(50.0, 500.0), &rect(), TooltipSize::new(200.0, 100.0));
        assert_eq!(direction, Direction::S);
    }

    #[test]
    fn test_near_left_edge_is_east() {
        let direction = choose_direction(Point::new(300.0, 20.0), &rect(), TooltipSize::new(200.0, 100.0));
        assert_eq!(direction, Direction::E);
    }

    #[test]
    fn test_near_right_edge_is_west() {
        let direction = choose_direction(Point::new(300.0, 980.0), &rect(), TooltipSize::new(200.0, 100.0));
        assert_eq!(direction, Direction::W);
    }

    #[test]
    fn test_top_left_corner_is_south_east() {
        let direction = choose_direction(Point::new(10.0, 10.0), &rect(), TooltipSize::new(200.0, 100.0));
        assert_eq!(direction, Direction::Se);
    }

    #[test]
    fn test_top_right_corner_is_south_west() {
        let direction = choose_direction(Point::new(10.0, 990.0), &rect(), TooltipSize::new(200.0, 100.0));
        assert_eq!(direction, Direction::Sw);
    }

    #[test]
    fn test_direction_names() {
        assert_eq!(Direction::Se.to_string(), "se");
        assert_eq!(Direction::default(), Direction::N);
    }

    #[test]
    fn test_rect_from_bounds() {
        let bounds = BoundingBox::new(800.0, 600.0).with_offsets(10.0, 20.0, 820.0, 610.0);
        let rect = ContainerRect::from(&bounds);
        assert!((rect.left - 20.0).abs() < f64::EPSILON);
        assert!((rect.bottom - 610.0).abs() < f64::EPSILON);
    }
}
