#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixels.
//!
//! Coordinates are viewport-relative with the origin at the top-left corner.
//! Positions are signed because a box may sit partly above or left of the
//! viewport; extents are unsigned.

/// A rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[inline]
const fn extent(v: u32) -> i32 {
    if v > i32::MAX as u32 {
        i32::MAX
    } else {
        v as i32
    }
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at `(x, y)` with the given size.
    #[inline]
    pub const fn from_origin_size(x: i32, y: i32, size: Size) -> Self {
        Self::new(x, y, size.width, size.height)
    }

    /// Left edge (inclusive). Alias for `self.x`.
    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (inclusive). Alias for `self.y`.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(extent(self.width))
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(extent(self.height))
    }

    /// Horizontal center, rounded toward the left edge.
    #[inline]
    pub const fn center_x(&self) -> i32 {
        self.x.saturating_add(extent(self.width / 2))
    }

    /// Size of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Everything placement needs to know about a tooltip's surroundings.
///
/// Delivered by the host whenever the size-change watcher fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutMetrics {
    /// Bounding box of the host element (the trigger region).
    pub anchor: Rect,
    /// Rendered size of the tooltip content box.
    pub content: Size,
    /// Size of the viewport.
    pub viewport: Size,
}

impl LayoutMetrics {
    /// Create a new metrics snapshot.
    #[inline]
    pub const fn new(anchor: Rect, content: Size, viewport: Size) -> Self {
        Self {
            anchor,
            content,
            viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(-5, 10, 20, 4);
        assert_eq!(r.left(), -5);
        assert_eq!(r.top(), 10);
        assert_eq!(r.right(), 15);
        assert_eq!(r.bottom(), 14);
        assert_eq!(r.center_x(), 5);
    }

    #[test]
    fn rect_edges_saturate() {
        let r = Rect::new(i32::MAX - 1, i32::MAX - 1, u32::MAX, u32::MAX);
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.bottom(), i32::MAX);
    }

    #[test]
    fn from_origin_size_keeps_extent() {
        let r = Rect::from_origin_size(-7, 3, Size::new(40, 12));
        assert_eq!(r, Rect::new(-7, 3, 40, 12));
        assert_eq!(r.size(), Size::new(40, 12));
    }

    #[test]
    fn center_x_rounds_toward_left() {
        assert_eq!(Rect::new(0, 0, 5, 1).center_x(), 2);
        assert_eq!(Rect::new(-10, 0, 0, 1).center_x(), -10);
    }

    #[test]
    fn huge_extent_clamps_to_i32() {
        let r = Rect::new(0, -1, u32::MAX, u32::MAX);
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.bottom(), i32::MAX - 1);
        assert_eq!(r.center_x(), i32::MAX);
    }

    #[test]
    fn layout_metrics_default_is_zeroed() {
        let m = LayoutMetrics::default();
        assert_eq!(m.anchor, Rect::new(0, 0, 0, 0));
        assert_eq!(m.content, Size::new(0, 0));
        assert_eq!(m.viewport, Size::new(0, 0));
    }
}
