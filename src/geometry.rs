//! Pixel-space geometry shared by the placement engine and the drawing helpers.

use serde::{Deserialize, Serialize};

/// Integer pixel coordinate. May lie outside the image while the pointer is dragged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_f32(self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Selection rectangle as the user drew it.
///
/// `previous` is where the pointer went down, `current` where it was released.
/// Either point may be the top-left one; use [`Rectangle::normalized`] before
/// doing pixel work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub previous: Point,
    pub current: Point,
}

impl Rectangle {
    pub const fn new(previous: Point, current: Point) -> Self {
        Self { previous, current }
    }

    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Signed extent from `previous` to `current`, as shown in the coordinate panel.
    pub fn size(&self) -> (i32, i32) {
        (
            self.current.x - self.previous.x,
            self.current.y - self.previous.y,
        )
    }

    /// Both corners are the same point (a click without a drag).
    pub fn is_degenerate(&self) -> bool {
        self.previous == self.current
    }

    /// Orders the corners and clips them to a `width` x `height` image.
    ///
    /// Returns `None` when nothing of the rectangle is left inside the image.
    pub fn normalized(&self, width: u32, height: u32) -> Option<PixelRect> {
        let clamp = |v: i32, max: u32| v.clamp(0, max.min(i32::MAX as u32) as i32) as u32;

        let x1 = clamp(self.previous.x.min(self.current.x), width);
        let x2 = clamp(self.previous.x.max(self.current.x), width);
        let y1 = clamp(self.previous.y.min(self.current.y), height);
        let y2 = clamp(self.previous.y.max(self.current.y), height);

        let rect = PixelRect::new(x1, y1, x2 - x1, y2 - y1);
        rect.is_valid().then_some(rect)
    }
}

/// One of the four corners of an axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Normalized rectangle in pixel coordinates.
///
/// The right and bottom edges (`x2`, `y2`) are exclusive, so a rectangle
/// covering a whole `W` x `H` image has `x2() == W` and `y2() == H`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x2(&self) -> u32 {
        self.x + self.width
    }

    pub fn y2(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x && other.y >= self.y && other.x2() <= self.x2() && other.y2() <= self.y2()
    }

    /// Pixel position of `anchor` on this rectangle's outline.
    pub fn anchor(&self, anchor: Anchor) -> Point {
        let (x1, y1) = (self.x as i32, self.y as i32);
        let (x2, y2) = (self.x2() as i32, self.y2() as i32);
        match anchor {
            Anchor::TopLeft => Point::new(x1, y1),
            Anchor::TopRight => Point::new(x2, y1),
            Anchor::BottomLeft => Point::new(x1, y2),
            Anchor::BottomRight => Point::new(x2, y2),
        }
    }
}

/// Straight line between two points, used for connector lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        let dx = (self.end.x - self.start.x) as f32;
        let dy = (self.end.y - self.start.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}
