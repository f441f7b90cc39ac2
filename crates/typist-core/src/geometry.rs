#![forbid(unsafe_code)]

//! Geometric primitives.

/// A rectangle in page cell coordinates (0-indexed, origin at top-left).
///
/// Output regions and the viewport share one coordinate space, so scrolling
/// is expressed by moving the viewport's `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Fraction of `self` covered by `other`, in [0.0, 1.0].
    ///
    /// An empty rectangle counts as fully covered when its origin lies inside
    /// `other`, so zero-size regions can still become visible.
    pub fn coverage_by(&self, other: &Rect) -> f32 {
        if self.is_empty() {
            let inside = self.x >= other.x
                && self.x < other.right()
                && self.y >= other.y
                && self.y < other.bottom();
            return if inside { 1.0 } else { 0.0 };
        }
        let covered = self.intersection_opt(other).map_or(0, |r| r.area());
        (covered as f64 / self.area() as f64) as f32
    }
}
