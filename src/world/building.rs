//! Building placement along the road network

use serde::{Deserialize, Serialize};

use crate::consts::BUILDING_CLEARANCE_EPSILON;
use crate::geometry::{Envelope, Polygon, Segment, union};
use crate::graph::Graph;
use crate::settings::WorldSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub base: Polygon,
    pub height: f64,
}

impl Building {
    pub fn new(base: Polygon, height: f64) -> Self {
        Self { base, height }
    }
}

/// Line buildings up along the outer edge of a wide road envelope
pub(crate) fn generate(graph: &Graph, settings: &WorldSettings) -> Vec<Building> {
    let reach = settings.road_width + settings.building_width + settings.spacing * 2.0;
    let outer: Vec<Polygon> = graph
        .segments()
        .iter()
        .map(|&seg| Envelope::new(seg, reach, settings.road_roundness).poly)
        .collect();

    let guides: Vec<Segment> = union(&outer)
        .into_iter()
        .filter(|seg| seg.length() >= settings.building_min_length)
        .collect();

    let supports: Vec<Segment> = guides
        .iter()
        .flat_map(|guide| subdivide(guide, settings.building_min_length, settings.spacing))
        .collect();

    let bases = supports
        .into_iter()
        .map(|support| Envelope::new(support, settings.building_width, 1).poly);

    let mut kept: Vec<Polygon> = Vec::new();
    for base in bases {
        let clashes = kept.iter().any(|other| {
            other.intersects_poly(&base)
                || other.distance_to_poly(&base) < settings.spacing - BUILDING_CLEARANCE_EPSILON
        });
        if !clashes {
            kept.push(base);
        }
    }

    kept.into_iter()
        .map(|base| Building::new(base, settings.building_height))
        .collect()
}

/// Equal-length pieces of `guide` with `spacing` gaps, each at least
/// `min_length` long
fn subdivide(guide: &Segment, min_length: f64, spacing: f64) -> Vec<Segment> {
    let len = guide.length() + spacing;
    let count = (len / (min_length + spacing)).floor() as usize;
    if count == 0 {
        return Vec::new();
    }
    let piece = len / count as f64 - spacing;
    let dir = guide.direction_vector();

    let mut out = Vec::with_capacity(count);
    let mut q1 = guide.p1;
    for _ in 0..count {
        let q2 = q1 + dir * piece;
        out.push(Segment::new(q1, q2));
        q1 = q2 + dir * spacing;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_subdivide_fills_guide() {
        let guide = Segment::new(Point::new(0.0, 0.0), Point::new(450.0, 0.0));
        let pieces = subdivide(&guide, 150.0, 50.0);
        // (450 + 50) / 200 = 2.5 -> 2 buildings of 200
        assert_eq!(pieces.len(), 2);
        assert!((pieces[0].length() - 200.0).abs() < 1e-9);
        assert!((pieces[1].p1.x - 250.0).abs() < 1e-9);
        assert!((pieces[1].p2.x - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_guide_yields_nothing() {
        let guide = Segment::new(Point::new(0.0, 0.0), Point::new(50.0, 0.0));
        assert!(subdivide(&guide, 150.0, 50.0).is_empty());
    }

    #[test]
    fn test_straight_road_gets_buildings_on_both_sides() {
        let (a, b) = (Point::new(0.0, 0.0), Point::new(1000.0, 0.0));
        let graph = Graph::new(vec![a, b], vec![Segment::new(a, b)]);
        let settings = WorldSettings::default();
        let buildings = generate(&graph, &settings);
        assert!(!buildings.is_empty());
        assert!(buildings.iter().any(|b| b.base.points()[0].y > 0.0));
        assert!(buildings.iter().any(|b| b.base.points()[0].y < 0.0));

        let road = Envelope::new(Segment::new(a, b), settings.road_width, settings.road_roundness);
        for building in &buildings {
            assert!(!building.base.intersects_poly(&road.poly));
            for other in &buildings {
                if !std::ptr::eq(building, other) {
                    assert!(!building.base.intersects_poly(&other.base));
                }
            }
        }
    }

    #[test]
    fn test_empty_graph() {
        assert!(generate(&Graph::default(), &WorldSettings::default()).is_empty());
    }
}
