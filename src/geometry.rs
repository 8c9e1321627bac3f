//! Screen and image geometry.
//!
//! Three coordinate spaces meet here: grid cells of the [`Board`](crate::engine::Board),
//! pixels of the captured image, and absolute screen pixels. The captured image
//! covers the capture region exactly, so image pixels become screen pixels by
//! adding the region's top-left corner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// An integer pixel position (image or screen space).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    /// Saturates at the `i32` range instead of overflowing.
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pixel dimensions of a captured image or a screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A screen rectangle; used for the capture region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    /// Top-left corner, the offset that turns image pixels into screen pixels.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the absolute screen point lies inside `[left, left+width) x [top, top+height)`.
    pub fn contains(&self, p: Point) -> bool {
        let dx = i64::from(p.x) - i64::from(self.left);
        let dy = i64::from(p.y) - i64::from(self.top);
        dx >= 0 && dy >= 0 && dx < i64::from(self.width) && dy < i64::from(self.height)
    }

    /// Translates an image-space point into absolute screen space.
    pub fn to_screen(&self, image_point: Point) -> Point {
        image_point + self.origin()
    }
}

/// Maps grid cells onto the pixels of the image the board was recognised from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMapper {
    columns: usize,
    rows: usize,
    image: Size,
}

impl CellMapper {
    pub fn new(columns: usize, rows: usize, image: Size) -> Self {
        CellMapper {
            columns,
            rows,
            image,
        }
    }

    /// Pixel at the centre of cell `(x, y)`:
    /// `((x + 0.5) * imageWidth / columns, (y + 0.5) * imageHeight / rows)`,
    /// truncated toward zero.
    pub fn cell_center(&self, x: usize, y: usize) -> Point {
        if self.columns == 0 || self.rows == 0 {
            return Point::default();
        }
        let px = (x as f32 + 0.5) * self.image.width as f32 / self.columns as f32;
        let py = (y as f32 + 0.5) * self.image.height as f32 / self.rows as f32;
        Point::new(px as i32, py as i32)
    }
}
