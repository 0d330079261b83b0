#![forbid(unsafe_code)]

//! Geometric primitives.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in viewport units (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height in viewport units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A measured rectangle: the bounding box of a live element, a highlight
/// cutout, or the viewport itself.
///
/// Edges may lie outside the viewport (negative `x`/`y` for content scrolled
/// past the top or left edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Rendered width.
    pub width: i32,
    /// Rendered height.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Horizontal center, rounded toward the left edge.
    #[inline]
    pub const fn center_x(&self) -> i32 {
        self.x.saturating_add(self.width / 2)
    }

    /// Vertical center, rounded toward the top edge.
    #[inline]
    pub const fn center_y(&self) -> i32 {
        self.y.saturating_add(self.height / 2)
    }

    /// Check if the rectangle has zero (or negative) extent.
    ///
    /// An element measured with an empty rect is considered not rendered,
    /// e.g. hidden by a responsive layout rule.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Grow the rectangle by the given padding on each side.
    pub fn outer(&self, padding: Sides) -> Rect {
        Rect {
            x: self.x.saturating_sub(padding.left),
            y: self.y.saturating_sub(padding.top),
            width: self.width.saturating_add(padding.horizontal_sum()),
            height: self.height.saturating_add(padding.vertical_sum()),
        }
    }

    /// The same rectangle moved by `(dx, dy)`.
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            width: self.width,
            height: self.height,
        }
    }
}

/// Sides for padding/margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sides {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: i32) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub const fn horizontal_sum(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    /// Sum of top and bottom.
    #[inline]
    pub const fn vertical_sum(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Sides, Size};

    #[test]
    fn rect_allows_negative_origin() {
        let rect = Rect::new(-10, -4, 20, 8);
        assert_eq!(rect.left(), -10);
        assert_eq!(rect.top(), -4);
        assert_eq!(rect.right(), 10);
        assert_eq!(rect.bottom(), 4);
    }

    #[test]
    fn rect_centers_round_toward_origin() {
        let rect = Rect::new(10, 20, 5, 3);
        assert_eq!(rect.center_x(), 12);
        assert_eq!(rect.center_y(), 21);
    }

    #[test]
    fn rect_empty_when_any_dimension_collapses() {
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(0, 0, 10, 0).is_empty());
        assert!(Rect::new(0, 0, -3, 10).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
        assert!(Size::new(320, 0).is_empty());
        assert!(!Size::new(320, 180).is_empty());
    }

    #[test]
    fn rect_outer_expands_every_side() {
        let rect = Rect::new(100, 50, 40, 20);
        assert_eq!(rect.outer(Sides::all(6)), Rect::new(94, 44, 52, 32));
    }

    #[test]
    fn rect_edges_saturate_at_extremes() {
        let rect = Rect::new(i32::MAX - 1, i32::MIN, 10, i32::MAX);
        assert_eq!(rect.right(), i32::MAX);
        assert_eq!(rect.bottom(), -1);
        assert_eq!(rect.outer(Sides::all(4)).x, i32::MAX - 5);
        assert_eq!(rect.outer(Sides::all(4)).y, i32::MIN);
        assert_eq!(rect.translate(10, -10), Rect::new(i32::MAX, i32::MIN, 10, i32::MAX));
    }

    #[test]
    fn rect_translate_keeps_size() {
        let rect = Rect::new(10, 20, 30, 40).translate(-15, 5);
        assert_eq!(rect, Rect::new(-5, 25, 30, 40));
    }

    #[test]
    fn sides_sums_saturate() {
        let sides = Sides::all(3);
        assert_eq!(sides.horizontal_sum(), 6);
        assert_eq!(sides.vertical_sum(), 6);
        assert_eq!(Sides::all(i32::MAX).horizontal_sum(), i32::MAX);
    }
}
