//! Road skeleton graph
//!
//! Points are nodes, segments are edges referencing points by equality.
//! Invariants: no self-loops, no duplicate segments (same endpoint set),
//! removing a point removes every segment touching it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::geometry::{Point, Segment};
use crate::persistence::GraphRecord;

/// Which endpoint of a one-way segment traffic leaves from.
///
/// Driving conventions differ by region, so this is stored on the graph
/// instead of being baked into traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OneWayConvention {
    /// Traffic flows `p1 -> p2`
    #[default]
    FromP1,
    /// Traffic flows `p2 -> p1`
    FromP2,
}

/// Road skeleton
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord", into = "GraphRecord")]
pub struct Graph {
    pub(crate) points: Vec<Point>,
    pub(crate) segments: Vec<Segment>,
    pub(crate) convention: OneWayConvention,
}

/// Per-call Dijkstra bookkeeping, indexed like `Graph::points`
#[derive(Debug, Clone, Copy)]
struct PathScratch {
    dist: f64,
    visited: bool,
    prev: Option<usize>,
}

impl Graph {
    pub fn new(points: Vec<Point>, segments: Vec<Segment>) -> Self {
        Self {
            points,
            segments,
            convention: OneWayConvention::default(),
        }
    }

    pub fn with_convention(mut self, convention: OneWayConvention) -> Self {
        self.convention = convention;
        self
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn convention(&self) -> OneWayConvention {
        self.convention
    }

    pub fn set_convention(&mut self, convention: OneWayConvention) {
        self.convention = convention;
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.points.contains(&point)
    }

    fn index_of(&self, point: Point) -> Option<usize> {
        self.points.iter().position(|&p| p == point)
    }

    /// Add `point` unless an equal point already exists
    pub fn try_add_point(&mut self, point: Point) -> bool {
        if self.contains_point(point) {
            return false;
        }
        self.add_point(point);
        true
    }

    /// Remove `point` and every segment touching it
    pub fn remove_point(&mut self, point: Point) -> bool {
        let Some(idx) = self.index_of(point) else {
            return false;
        };
        self.segments.retain(|seg| !seg.includes(point));
        self.points.remove(idx);
        true
    }

    pub fn add_segment(&mut self, seg: Segment) {
        self.segments.push(seg);
    }

    pub fn contains_segment(&self, seg: &Segment) -> bool {
        self.segments.contains(seg)
    }

    /// Add `seg` unless it is a self-loop or duplicates an existing segment
    pub fn try_add_segment(&mut self, seg: Segment) -> bool {
        if seg.p1 == seg.p2 || self.contains_segment(&seg) {
            return false;
        }
        self.add_segment(seg);
        true
    }

    pub fn remove_segment(&mut self, seg: &Segment) -> bool {
        let Some(idx) = self.segments.iter().position(|s| s == seg) else {
            return false;
        };
        self.segments.remove(idx);
        true
    }

    /// Segments having `point` as an endpoint
    pub fn segments_with_point(&self, point: Point) -> Vec<Segment> {
        self.segments
            .iter()
            .filter(|seg| seg.includes(point))
            .copied()
            .collect()
    }

    /// Segments traffic may take when leaving `point`.
    ///
    /// Two-way segments leave from either endpoint; one-way segments only
    /// from the start endpoint picked by the graph's [`OneWayConvention`].
    pub fn segments_leaving_from(&self, point: Point) -> Vec<Segment> {
        self.segments
            .iter()
            .filter(|seg| {
                if !seg.one_way {
                    return seg.includes(point);
                }
                match self.convention {
                    OneWayConvention::FromP1 => seg.p1 == point,
                    OneWayConvention::FromP2 => seg.p2 == point,
                }
            })
            .copied()
            .collect()
    }

    /// Points where more than two segments meet
    pub fn intersections(&self) -> Vec<Point> {
        self.points
            .iter()
            .filter(|&&p| self.segments.iter().filter(|s| s.includes(p)).count() > 2)
            .copied()
            .collect()
    }

    /// Shortest route from `start` to `end`, both inclusive.
    ///
    /// Dijkstra with a linear scan over unvisited points (graphs are small).
    /// Returns an empty path when either point is missing or `end` cannot be
    /// reached.
    pub fn shortest_path(&self, start: Point, end: Point) -> Vec<Point> {
        let (Some(start_idx), Some(end_idx)) = (self.index_of(start), self.index_of(end)) else {
            log::warn!("shortest_path: endpoint not in graph");
            return Vec::new();
        };

        let mut scratch = vec![
            PathScratch {
                dist: f64::INFINITY,
                visited: false,
                prev: None,
            };
            self.points.len()
        ];
        scratch[start_idx].dist = 0.0;

        let mut current = start_idx;
        loop {
            let here = self.points[current];
            for seg in self.segments_leaving_from(here) {
                let other = if seg.p1 == here { seg.p2 } else { seg.p1 };
                let Some(other_idx) = self.index_of(other) else {
                    continue;
                };
                let candidate = scratch[current].dist + seg.length();
                if candidate < scratch[other_idx].dist {
                    scratch[other_idx].dist = candidate;
                    scratch[other_idx].prev = Some(current);
                }
            }
            scratch[current].visited = true;

            if current == end_idx {
                break;
            }

            // First unvisited point with the smallest finite distance
            let next = scratch
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.visited && s.dist.is_finite())
                .min_by(|(_, a), (_, b)| a.dist.total_cmp(&b.dist))
                .map(|(i, _)| i);
            match next {
                Some(idx) => current = idx,
                None => {
                    log::debug!("shortest_path: target unreachable");
                    return Vec::new();
                }
            }
        }

        let mut path = Vec::new();
        let mut cursor = Some(end_idx);
        while let Some(idx) = cursor {
            path.push(self.points[idx]);
            cursor = scratch[idx].prev;
        }
        path.reverse();
        path
    }

    /// Remove every point and segment
    pub fn dispose(&mut self) {
        self.points.clear();
        self.segments.clear();
    }

    /// Fingerprint of the graph contents, used to detect edits
    pub fn hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for p in &self.points {
            p.x.to_bits().hash(&mut hasher);
            p.y.to_bits().hash(&mut hasher);
        }
        for s in &self.segments {
            for p in [s.p1, s.p2] {
                p.x.to_bits().hash(&mut hasher);
                p.y.to_bits().hash(&mut hasher);
            }
            s.one_way.hash(&mut hasher);
        }
        self.convention.hash(&mut hasher);
        hasher.finish()
    }

    /// Check invariants on data coming from outside the crate
    pub(crate) fn validate(&self) -> crate::Result<()> {
        for (i, seg) in self.segments.iter().enumerate() {
            for p in [seg.p1, seg.p2] {
                if !self.contains_point(p) {
                    return Err(SimError::Persistence(format!(
                        "segment {i} references unknown point ({}, {})",
                        p.x, p.y
                    )));
                }
            }
            if seg.p1 == seg.p2 {
                return Err(SimError::Persistence(format!("segment {i} is a self-loop")));
            }
            if self.segments[..i].contains(seg) {
                return Err(SimError::Persistence(format!("segment {i} is a duplicate")));
            }
        }
        Ok(())
    }
}
