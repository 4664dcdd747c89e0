//! Axis-aligned rectangle used for drag selection.

use crate::Vector2D;

/// Rectangle spanned by two arbitrary corner points.
///
/// The corners are stored exactly as given (typically the press point and the
/// current cursor position of a drag), so either corner may be the minimum.
/// Containment normalizes the bounds on every query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle2D {
    top_left: Vector2D,
    bottom_right: Vector2D,
}

impl Rectangle2D {
    /// Creates a rectangle from two corners given in any order.
    #[must_use]
    pub const fn new(top_left: Vector2D, bottom_right: Vector2D) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Creates a degenerate rectangle anchored at a single point.
    #[must_use]
    pub const fn at_point(point: Vector2D) -> Self {
        Self::new(point, point)
    }

    /// Corner the rectangle was anchored at.
    #[must_use]
    pub const fn top_left(&self) -> Vector2D {
        self.top_left
    }

    /// Corner that follows the cursor while dragging.
    #[must_use]
    pub const fn bottom_right(&self) -> Vector2D {
        self.bottom_right
    }

    /// Moves the free corner, keeping the anchor in place.
    pub fn set_bottom_right(&mut self, corner: Vector2D) {
        self.bottom_right = corner;
    }

    /// Component-wise minimum of the two corners.
    #[must_use]
    pub fn min(&self) -> Vector2D {
        self.top_left.min(self.bottom_right)
    }

    /// Component-wise maximum of the two corners.
    #[must_use]
    pub fn max(&self) -> Vector2D {
        self.top_left.max(self.bottom_right)
    }

    /// Reports whether the point lies strictly inside the rectangle.
    ///
    /// Points on the boundary are outside, so a rectangle with zero width or
    /// height contains nothing.
    #[must_use]
    pub fn inside(&self, point: Vector2D) -> bool {
        let min = self.min();
        let max = self.max();
        point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
    }
}
