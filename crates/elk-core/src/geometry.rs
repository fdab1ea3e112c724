//! Plain 2D geometry shared by the transformer, renderers and the viewport.

use serde::{Deserialize, Serialize};

/// A point in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn sub(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Rotate this vector around the origin by `r` radians.
    ///
    /// Used to align connector offsets with the local edge tangent.
    pub fn rotate(self, r: f64) -> Self {
        let (sin, cos) = r.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Angle of this vector against the positive x axis, in radians.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Linear interpolation towards `to` at `t` in `[0, 1]`.
    pub fn lerp(self, to: Point, t: f64) -> Self {
        Self::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(position: Point, size: Dimension) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest box covering every point in `points`; `None` for no points.
    pub fn around(points: &[Point]) -> Option<Bounds> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Union of two boxes.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Linear interpolation of position and size.
    pub fn lerp(&self, to: &Bounds, t: f64) -> Bounds {
        Bounds::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.width + (to.width - self.width) * t,
            self.height + (to.height - self.height) * t,
        )
    }
}
