//! 2D points
//!
//! A point is both a geometric value and, inside a [`crate::Graph`], a node.
//! Equality is exact coordinate match.

use std::ops::{Add, Mul, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A point in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn as_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Euclidean distance
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        self.as_vec().distance(other.as_vec())
    }

    /// Length of the point seen as a vector
    #[inline]
    pub fn magnitude(self) -> f64 {
        self.as_vec().length()
    }

    /// Polar angle of the point seen as a vector
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unit vector in the same direction (zero stays zero)
    #[inline]
    pub fn normalize(self) -> Point {
        self.as_vec().normalize_or_zero().into()
    }

    #[inline]
    pub fn dot(self, other: Point) -> f64 {
        self.as_vec().dot(other.as_vec())
    }

    /// Vector rotated 90° counter-clockwise
    #[inline]
    pub fn perpendicular(self) -> Point {
        self.as_vec().perp().into()
    }

    /// Move `offset` units from this point along `angle`
    #[inline]
    pub fn translate(self, angle: f64, offset: f64) -> Point {
        (self.as_vec() + DVec2::from_angle(angle) * offset).into()
    }

    /// Midpoint
    #[inline]
    pub fn average(self, other: Point) -> Point {
        ((self.as_vec() + other.as_vec()) * 0.5).into()
    }

    /// Interpolate toward `other`
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            crate::lerp(self.x, other.x, t),
            crate::lerp(self.y, other.y, t),
        )
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        p.as_vec()
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

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Closest point to `loc` that is nearer than `threshold`
pub fn nearest_point(loc: Point, points: &[Point], threshold: f64) -> Option<Point> {
    let mut min_dist = f64::MAX;
    let mut nearest = None;
    for &point in points {
        let dist = point.distance(loc);
        if dist < min_dist && dist < threshold {
            min_dist = dist;
            nearest = Some(point);
        }
    }
    nearest
}
