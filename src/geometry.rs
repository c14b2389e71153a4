//! Points, node shapes and axis-aligned bounds.

use std::ops::{Add, Sub};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation: `self + t * (to - self)`.
    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Outline of a node, centered on the node's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { width: f64, height: f64 },
    Diamond { width: f64, height: f64 },
    Ellipse { rx: f64, ry: f64 },
}

impl Shape {
    /// Half width and half height of the axis-aligned footprint.
    pub fn half_extents(&self) -> (f64, f64) {
        match *self {
            Shape::Rect { width, height } | Shape::Diamond { width, height } => {
                (width / 2.0, height / 2.0)
            }
            Shape::Ellipse { rx, ry } => (rx, ry),
        }
    }

    /// Whether `p` lies inside the shape drawn around `center`.
    pub fn contains(&self, center: Point, p: Point) -> bool {
        let d = p - center;
        let (hw, hh) = self.half_extents();
        if hw <= 0.0 || hh <= 0.0 {
            return false;
        }
        match self {
            Shape::Rect { .. } => d.x.abs() <= hw && d.y.abs() <= hh,
            Shape::Diamond { .. } => d.x.abs() / hw + d.y.abs() / hh <= 1.0,
            Shape::Ellipse { .. } => (d.x / hw).powi(2) + (d.y / hh).powi(2) <= 1.0,
        }
    }
}

/// Running min/max over shape footprints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl Bounds {
    pub fn include(&mut self, center: Point, shape: &Shape) {
        let (hw, hh) = shape.half_extents();
        self.min_x = self.min_x.min(center.x - hw);
        self.min_y = self.min_y.min(center.y - hh);
        self.max_x = self.max_x.max(center.x + hw);
        self.max_y = self.max_y.max(center.y + hh);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }
}
