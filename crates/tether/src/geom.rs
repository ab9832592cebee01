#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// Unit vector pointing along `angle` (radians, y axis pointing down).
pub fn unit(angle: f64) -> Vector {
    vector(angle.cos(), angle.sin())
}

/// Axis-aligned, container-relative rectangle of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl EntityRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        point(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grows the rect by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Inclusive overlap test against the bounding box of the segment `a..b`.
    pub fn overlaps_segment_bounds(&self, a: Point, b: Point) -> bool {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        min_x <= self.right() && max_x >= self.left() && min_y <= self.bottom() && max_y >= self.top()
    }

    /// Largest absolute coordinate delta between two rects.
    pub fn max_delta(&self, other: &Self) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.width - other.width).abs())
            .max((self.height - other.height).abs())
    }
}
