//! Line segments, intersection and projection
//!
//! Degenerate inputs (parallel lines, zero-length segments) produce `None`
//! rather than errors: callers treat them as "no interaction".

use serde::{Deserialize, Serialize};

use super::point::Point;
use crate::consts::INTERSECTION_EPSILON;

/// Ordered pair of endpoints.
///
/// Equality ignores endpoint order and the one-way flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
    /// Traversable only from its designated start endpoint
    #[serde(default)]
    pub one_way: bool,
}

/// Result of a successful segment/segment intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// Parameter along the first segment (0 at its start, 1 at its end)
    pub offset: f64,
}

/// Orthogonal projection onto a segment's supporting line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: Point,
    /// Parameter along the segment; may fall outside [0, 1]
    pub offset: f64,
}

impl Segment {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            one_way: false,
        }
    }

    pub fn one_way(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            one_way: true,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    /// Unit vector from `p1` toward `p2`
    #[inline]
    pub fn direction_vector(&self) -> Point {
        (self.p2 - self.p1).normalize()
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        self.p1.average(self.p2)
    }

    /// Whether `point` is one of the two endpoints
    #[inline]
    pub fn includes(&self, point: Point) -> bool {
        self.p1 == point || self.p2 == point
    }

    /// Project `point` onto the segment's line. `None` for a zero-length segment.
    pub fn project_point(&self, point: Point) -> Option<Projection> {
        let a = point - self.p1;
        let b = self.p2 - self.p1;
        let len = b.magnitude();
        if len == 0.0 {
            return None;
        }
        let dir = b * (1.0 / len);
        let scaler = a.dot(dir);
        Some(Projection {
            point: self.p1 + dir * scaler,
            offset: scaler / len,
        })
    }

    /// Shortest distance from `point` to the segment (clamped to the endpoints)
    pub fn distance_to_point(&self, point: Point) -> f64 {
        match self.project_point(point) {
            Some(proj) if proj.offset > 0.0 && proj.offset < 1.0 => point.distance(proj.point),
            _ => point.distance(self.p1).min(point.distance(self.p2)),
        }
    }

    /// Intersection with another segment, offset measured along `self`
    #[inline]
    pub fn intersection(&self, other: &Segment) -> Option<Intersection> {
        get_intersection(self.p1, self.p2, other.p1, other.p2)
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.includes(other.p1) && self.includes(other.p2)
    }
}

/// Parameters `(t, u)` of the crossing between AB and CD, both in [0, 1].
///
/// `t` runs along AB and `u` along CD.
pub(crate) fn intersection_params(a: Point, b: Point, c: Point, d: Point) -> Option<(f64, f64)> {
    let t_top = (d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x);
    let u_top = (c.y - a.y) * (a.x - b.x) - (c.x - a.x) * (a.y - b.y);
    let bottom = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);

    if bottom.abs() <= INTERSECTION_EPSILON {
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Intersection point of segments AB and CD
pub fn get_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Intersection> {
    intersection_params(a, b, c, d).map(|(t, _)| Intersection {
        point: a.lerp(b, t),
        offset: t,
    })
}

/// Segment closest to `loc` that is nearer than `threshold`
pub fn nearest_segment(loc: Point, segments: &[Segment], threshold: f64) -> Option<Segment> {
    let mut min_dist = f64::MAX;
    let mut nearest = None;
    for seg in segments {
        let dist = seg.distance_to_point(loc);
        if dist < min_dist && dist < threshold {
            min_dist = dist;
            nearest = Some(*seg);
        }
    }
    nearest
}
