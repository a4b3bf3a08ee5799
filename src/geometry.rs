// Geometry module
// Points, sizes and rectangles in screen pixels, plus global/local frame mapping

use std::fmt;
use std::ops::{Add, Sub};

/// A pixel coordinate. Whether it is global (screen) or local (window) is
/// decided by the caller; the mapping helpers on `Rect` convert between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// Saturating: origins may sit at the i32 edges
impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Multiply both dimensions by `factor`, keeping at least one pixel per side
    pub fn scaled(&self, factor: f32) -> Size {
        if self.is_empty() {
            return *self;
        }
        let width = (self.width as f32 * factor).round() as u32;
        let height = (self.height as f32 * factor).round() as u32;
        Size::new(width.max(1), height.max(1))
    }

    /// Largest size with this aspect ratio that fits inside `bounds`.
    /// Smaller sizes are scaled up until they touch the bounds.
    pub fn fit_within(&self, bounds: Size) -> Size {
        if self.is_empty() || bounds.is_empty() {
            return Size::default();
        }

        let scale_x = bounds.width as f32 / self.width as f32;
        let scale_y = bounds.height as f32 / self.height as f32;
        let scale = scale_x.min(scale_y);

        let width = (self.width as f32 * scale).round() as u32;
        let height = (self.height as f32 * scale).round() as u32;

        Size::new(width.clamp(1, bounds.width), height.clamp(1, bounds.height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn from_xywh(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x.saturating_add((self.size.width / 2) as i32),
            self.origin.y.saturating_add((self.size.height / 2) as i32),
        )
    }

    /// Origin that places a rectangle of `inner` size centered in this one,
    /// expressed relative to this rectangle's origin
    pub fn centered_offset(&self, inner: Size) -> Point {
        Point::new(
            (self.size.width as i32 - inner.width as i32) / 2,
            (self.size.height as i32 - inner.height as i32) / 2,
        )
    }

    /// Convert a point local to this rectangle into global coordinates
    pub fn map_to_global(&self, local: Point) -> Point {
        self.origin + local
    }

    /// Convert a global point into coordinates local to this rectangle
    pub fn map_from_global(&self, global: Point) -> Point {
        global - self.origin
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.size, self.origin)
    }
}
