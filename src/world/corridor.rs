//! Driving corridor between two points of the road network
//!
//! The corridor is the road surface along the shortest route only, so a car
//! trained on it cannot wander into side streets.

use serde::{Deserialize, Serialize};

use crate::geometry::{Envelope, Point, Polygon, Segment, union};
use crate::graph::Graph;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corridor {
    /// Outline of the route's road surface
    pub borders: Vec<Segment>,
    /// Route centerline, start to end
    pub skeleton: Vec<Segment>,
}

impl Corridor {
    /// Snap `start` and `end` onto their nearest road segments and build the
    /// corridor along the shortest route between the snapped points.
    ///
    /// `None` when the graph has no segments or the route does not exist.
    pub fn between(graph: &Graph, start: Point, end: Point, width: f64, roundness: u32) -> Option<Self> {
        let mut graph = graph.clone();
        let (start_seg, start_at) = snap(&graph, start)?;
        let (end_seg, end_at) = snap(&graph, end)?;

        graph.try_add_point(start_at.0);
        graph.try_add_point(end_at.0);
        for (seg, (point, _)) in [(start_seg, start_at), (end_seg, end_at)] {
            graph.try_add_segment(Segment {
                p1: seg.p1,
                p2: point,
                one_way: seg.one_way,
            });
            graph.try_add_segment(Segment {
                p1: point,
                p2: seg.p2,
                one_way: seg.one_way,
            });
        }
        if start_seg == end_seg {
            // Keep the original orientation so one-way roads stay one-way
            let (p1, p2) = if start_at.1 <= end_at.1 {
                (start_at.0, end_at.0)
            } else {
                (end_at.0, start_at.0)
            };
            graph.try_add_segment(Segment {
                p1,
                p2,
                one_way: start_seg.one_way,
            });
        }

        let path = graph.shortest_path(start_at.0, end_at.0);
        if path.len() < 2 {
            log::warn!("no corridor between ({}, {}) and ({}, {})", start.x, start.y, end.x, end.y);
            return None;
        }

        let skeleton: Vec<Segment> = path.windows(2).map(|w| Segment::new(w[0], w[1])).collect();
        let surfaces: Vec<Polygon> = skeleton
            .iter()
            .map(|&seg| Envelope::new(seg, width, roundness).poly)
            .collect();
        let borders = union(&surfaces);
        log::debug!(
            "corridor: {} skeleton segments, {} border segments",
            skeleton.len(),
            borders.len()
        );
        Some(Self { borders, skeleton })
    }

    /// Total route length
    pub fn length(&self) -> f64 {
        self.skeleton.iter().map(Segment::length).sum()
    }

    /// Fraction of the route covered when standing at `point`, in [0, 1].
    ///
    /// Measured to the projection of `point` onto the nearest skeleton segment.
    pub fn progress(&self, point: Point) -> f64 {
        let total = self.length();
        if total <= 0.0 {
            return 0.0;
        }
        let nearest = self
            .skeleton
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_to_point(point)
                    .total_cmp(&b.distance_to_point(point))
            })
            .map(|(i, _)| i);
        let Some(idx) = nearest else {
            return 0.0;
        };

        let before: f64 = self.skeleton[..idx].iter().map(Segment::length).sum();
        let seg = &self.skeleton[idx];
        let along = seg
            .project_point(point)
            .map_or(0.0, |proj| proj.offset.clamp(0.0, 1.0) * seg.length());
        ((before + along) / total).min(1.0)
    }
}

/// Nearest segment to `point` and the clamped projection onto it
fn snap(graph: &Graph, point: Point) -> Option<(Segment, (Point, f64))> {
    let seg = graph
        .segments()
        .iter()
        .min_by(|a, b| {
            a.distance_to_point(point)
                .total_cmp(&b.distance_to_point(point))
        })
        .copied()?;
    let offset = seg.project_point(point)?.offset.clamp(0.0, 1.0);
    Some((seg, (seg.p1.lerp(seg.p2, offset), offset)))
}
