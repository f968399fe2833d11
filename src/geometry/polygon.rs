//! Closed polygons and boundary union
//!
//! A polygon owns its points and a derived boundary segment list
//! (`points[i] -> points[(i + 1) % n]`). The segment list is only ever
//! replaced wholesale, by [`multi_break`], when overlapping polygons are
//! split at their mutual crossings.

use serde::{Deserialize, Serialize};

use super::point::Point;
use super::segment::{Segment, get_intersection, intersection_params};
use crate::consts::OUTER_POINT;
use crate::error::{Result, SimError};
use crate::persistence::PolygonRecord;

/// A closed polygon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PolygonRecord", into = "PolygonRecord")]
pub struct Polygon {
    points: Vec<Point>,
    segments: Vec<Segment>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        let n = points.len();
        let segments = (0..n)
            .map(|i| Segment::new(points[i], points[(i + 1) % n]))
            .collect();
        Self { points, segments }
    }

    /// Build a polygon from untrusted input, rejecting fewer than three points
    pub fn try_new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 3 {
            return Err(SimError::Persistence(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        Ok(Self::new(points))
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parity test against a ray from [`OUTER_POINT`]
    pub fn contains_point(&self, point: Point) -> bool {
        let outer = Point::new(OUTER_POINT.0, OUTER_POINT.1);
        let crossings = self
            .segments
            .iter()
            .filter(|seg| get_intersection(outer, point, seg.p1, seg.p2).is_some())
            .count();
        crossings % 2 == 1
    }

    /// Midpoint containment
    #[inline]
    pub fn contains_segment(&self, seg: &Segment) -> bool {
        self.contains_point(seg.midpoint())
    }

    /// Whether any boundary segments of the two polygons cross or touch
    pub fn intersects_poly(&self, other: &Polygon) -> bool {
        self.segments
            .iter()
            .any(|s1| other.segments.iter().any(|s2| s1.intersection(s2).is_some()))
    }

    /// Whether the boundary crosses or touches `seg`
    pub fn intersects_segment(&self, seg: &Segment) -> bool {
        self.segments.iter().any(|s| s.intersection(seg).is_some())
    }

    /// Distance from `point` to the nearest boundary segment
    pub fn distance_to_point(&self, point: Point) -> f64 {
        self.segments
            .iter()
            .map(|s| s.distance_to_point(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Smallest distance from any of this polygon's vertices to `other`'s boundary
    pub fn distance_to_poly(&self, other: &Polygon) -> f64 {
        self.points
            .iter()
            .map(|&p| other.distance_to_point(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Axis-aligned bounds as `(min, max)`
    pub fn bounds(&self) -> Option<(Point, Point)> {
        bounds_of(self.points.iter().copied())
    }
}

/// Axis-aligned bounds of a point cloud
pub(crate) fn bounds_of(points: impl IntoIterator<Item = Point>) -> Option<(Point, Point)> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

/// A pending cut of one boundary segment
#[derive(Debug, Clone, Copy)]
struct Split {
    segment: usize,
    offset: f64,
    point: Point,
}

/// Split every pair of polygons at their mutual crossings.
///
/// Pairs are processed in order, so later pairs see the segments produced
/// by earlier ones.
pub fn multi_break(polys: &mut [Polygon]) {
    for i in 0..polys.len() {
        for j in (i + 1)..polys.len() {
            let (head, tail) = polys.split_at_mut(j);
            break_pair(&mut head[i], &mut tail[0]);
        }
    }
}

fn break_pair(a: &mut Polygon, b: &mut Polygon) {
    let mut splits_a = Vec::new();
    let mut splits_b = Vec::new();

    for (i, s1) in a.segments.iter().enumerate() {
        for (j, s2) in b.segments.iter().enumerate() {
            let Some((t, u)) = intersection_params(s1.p1, s1.p2, s2.p1, s2.p2) else {
                continue;
            };
            // Both sides share the exact same point so the pieces stay welded
            let point = s1.p1.lerp(s1.p2, t);
            if t > 0.0 && t < 1.0 {
                splits_a.push(Split {
                    segment: i,
                    offset: t,
                    point,
                });
            }
            if u > 0.0 && u < 1.0 {
                splits_b.push(Split {
                    segment: j,
                    offset: u,
                    point,
                });
            }
        }
    }

    if !splits_a.is_empty() {
        a.segments = apply_splits(&a.segments, splits_a);
    }
    if !splits_b.is_empty() {
        b.segments = apply_splits(&b.segments, splits_b);
    }
}

/// Rebuild a segment list with every split applied, preserving boundary order
fn apply_splits(segments: &[Segment], mut splits: Vec<Split>) -> Vec<Segment> {
    splits.sort_by(|x, y| {
        x.segment
            .cmp(&y.segment)
            .then(x.offset.total_cmp(&y.offset))
    });

    let mut out = Vec::with_capacity(segments.len() + splits.len());
    let mut pending = splits.into_iter().peekable();
    for (idx, seg) in segments.iter().enumerate() {
        let mut start = seg.p1;
        while let Some(split) = pending.next_if(|s| s.segment == idx) {
            if split.point != start && split.point != seg.p2 {
                out.push(Segment {
                    p1: start,
                    p2: split.point,
                    one_way: seg.one_way,
                });
                start = split.point;
            }
        }
        out.push(Segment {
            p1: start,
            p2: seg.p2,
            one_way: seg.one_way,
        });
    }
    out
}

/// Outer boundary of a set of possibly overlapping polygons.
///
/// Returns a flat segment list; segments are not reassembled into rings.
pub fn union(polys: &[Polygon]) -> Vec<Segment> {
    let mut polys = polys.to_vec();
    multi_break(&mut polys);

    let mut kept = Vec::new();
    for (i, poly) in polys.iter().enumerate() {
        for seg in &poly.segments {
            let covered = polys
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && other.contains_segment(seg));
            if !covered {
                kept.push(*seg);
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ])
    }

    fn total_length(segments: &[Segment]) -> f64 {
        segments.iter().map(Segment::length).sum()
    }

    #[test]
    fn test_segments_close_the_ring() {
        let poly = square(0.0, 0.0, 10.0);
        assert_eq!(poly.segments().len(), 4);
        assert_eq!(poly.segments()[3].p2, poly.points()[0]);
    }

    #[test]
    fn test_contains_point() {
        let poly = square(0.0, 0.0, 10.0);
        assert!(poly.contains_point(Point::new(5.0, 5.0)));
        assert!(!poly.contains_point(Point::new(15.0, 5.0)));
        assert!(!poly.contains_point(Point::new(-1.0, -1.0)));
    }

    #[test]
    fn test_try_new_rejects_degenerate() {
        assert!(Polygon::try_new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]).is_err());
    }

    #[test]
    fn test_union_disjoint_keeps_everything() {
        let polys = [square(0.0, 0.0, 10.0), square(50.0, 50.0, 10.0)];
        let kept = union(&polys);
        assert_eq!(kept.len(), 8);
        assert!((total_length(&kept) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_overlapping_squares() {
        let polys = [square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)];
        let kept = union(&polys);
        // L-shaped outline: 2 * (15 + 15)
        assert!((total_length(&kept) - 60.0).abs() < 1e-9);
        assert_eq!(kept.len(), 8);
        for seg in &kept {
            let mid = seg.midpoint();
            let strictly_inside = |p: &Polygon| p.contains_point(mid) && p.distance_to_point(mid) > 1e-6;
            assert!(!strictly_inside(&polys[0]));
            assert!(!strictly_inside(&polys[1]));
        }
    }

    #[test]
    fn test_union_nested_drops_inner() {
        let polys = [square(0.0, 0.0, 100.0), square(40.0, 40.0, 10.0)];
        let kept = union(&polys);
        assert_eq!(kept.len(), 4);
        assert!((total_length(&kept) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_identical_squares_keeps_only_boundary() {
        let poly = square(0.0, 0.0, 10.0);
        let kept = union(&[poly.clone(), poly.clone()]);
        // Coincident edges are decided by the parity ray; whatever survives
        // lies on the shared boundary, never strictly inside the other square.
        assert!(kept.len() < 8);
        for seg in &kept {
            assert!(poly.segments().contains(seg));
        }
    }

    #[test]
    fn test_multi_break_splits_both_polygons() {
        let mut polys = vec![square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)];
        multi_break(&mut polys);
        assert_eq!(polys[0].segments().len(), 6);
        assert_eq!(polys[1].segments().len(), 6);
        // Perimeters are unchanged by splitting
        assert!((total_length(polys[0].segments()) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersects_and_distance() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let c = square(30.0, 0.0, 10.0);
        assert!(a.intersects_poly(&b));
        assert!(!a.intersects_poly(&c));
        assert!((a.distance_to_poly(&c) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_record_round_trip() {
        let poly = square(0.0, 0.0, 1.0);
        let json = serde_json::to_string(&poly).unwrap();
        assert!(json.starts_with(r#"{"points":["#));
        let back: Polygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back.points(), poly.points());
        assert_eq!(back.segments().len(), 4);
        assert!(serde_json::from_str::<Polygon>(r#"{"points":[{"x":0,"y":0}]}"#).is_err());
    }
}
