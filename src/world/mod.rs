//! World generation
//!
//! Everything derived from the road graph: road surfaces and their outer
//! borders, lane guides, building footprints and trees. Markings are placed
//! by the user and survive regeneration.

pub mod building;
pub mod corridor;
pub mod marking;
pub mod tree;

pub use building::Building;
pub use corridor::Corridor;
pub use marking::{Marking, MarkingKind};
pub use tree::{Tree, TreeKind};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::geometry::polygon::bounds_of;
use crate::geometry::{Envelope, Point, Polygon, Segment, union};
use crate::graph::Graph;
use crate::persistence::WorldRecord;
use crate::settings::WorldSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "WorldRecord", into = "WorldRecord")]
pub struct World {
    pub graph: Graph,
    pub settings: WorldSettings,
    pub envelopes: Vec<Envelope>,
    pub road_borders: Vec<Segment>,
    pub buildings: Vec<Building>,
    pub trees: Vec<Tree>,
    pub lane_guides: Vec<Segment>,
    pub markings: Vec<Marking>,
    /// Graph fingerprint the derived geometry was built from
    pub(crate) generated_hash: u64,
}

impl World {
    /// Build a world and run the full generation pipeline
    pub fn new(mut graph: Graph, settings: WorldSettings) -> Self {
        graph.set_convention(settings.one_way_convention);
        let mut world = Self {
            graph,
            settings,
            envelopes: Vec::new(),
            road_borders: Vec::new(),
            buildings: Vec::new(),
            trees: Vec::new(),
            lane_guides: Vec::new(),
            markings: Vec::new(),
            generated_hash: 0,
        };
        world.generate();
        world
    }

    /// Rebuild every derived layer from the current graph
    pub fn generate(&mut self) {
        let s = &self.settings;

        self.envelopes = self
            .graph
            .segments()
            .iter()
            .map(|&seg| Envelope::new(seg, s.road_width, s.road_roundness))
            .collect();

        let surfaces: Vec<Polygon> = self.envelopes.iter().map(|e| e.poly.clone()).collect();
        self.road_borders = union(&surfaces);

        self.buildings = building::generate(&self.graph, s);

        let anchors: Vec<Point> = self
            .road_borders
            .iter()
            .flat_map(|seg| [seg.p1, seg.p2])
            .chain(self.buildings.iter().flat_map(|b| b.base.points().iter().copied()))
            .collect();
        let illegal: Vec<&Polygon> = self
            .buildings
            .iter()
            .map(|b| &b.base)
            .chain(self.envelopes.iter().map(|e| &e.poly))
            .collect();
        let mut rng = Pcg32::seed_from_u64(s.seed);
        self.trees = tree::generate(&anchors, &illegal, s, &mut rng);

        self.lane_guides = self.generate_lane_guides();
        self.generated_hash = self.graph.hash();

        log::info!(
            "World generated: {} road borders, {} buildings, {} trees, {} lane guides",
            self.road_borders.len(),
            self.buildings.len(),
            self.trees.len(),
            self.lane_guides.len()
        );
    }

    fn generate_lane_guides(&self) -> Vec<Segment> {
        let s = &self.settings;
        let halves: Vec<Polygon> = self
            .graph
            .segments()
            .iter()
            .map(|&seg| Envelope::new(seg, s.road_width / 2.0, s.road_roundness).poly)
            .collect();
        union(&halves)
    }

    /// Regenerate when the graph was edited since the last generation.
    /// Returns whether anything was rebuilt.
    pub fn regenerate_if_changed(&mut self) -> bool {
        let hash = self.graph.hash();
        if hash == self.generated_hash {
            return false;
        }
        log::debug!("graph changed, regenerating world");
        self.generate();
        true
    }

    /// Lines cars should halt at
    pub fn stop_lines(&self) -> Vec<Segment> {
        let convention = self.graph.convention();
        self.markings
            .iter()
            .filter_map(|m| m.border(convention))
            .collect()
    }

    pub fn markings_of(&self, kind: MarkingKind) -> impl Iterator<Item = &Marking> {
        self.markings.iter().filter(move |m| m.kind == kind)
    }

    /// Road-only corridor between two points, see [`Corridor::between`]
    pub fn generate_corridor(&self, start: Point, end: Point) -> Option<Corridor> {
        Corridor::between(
            &self.graph,
            start,
            end,
            self.settings.road_width,
            self.settings.road_roundness,
        )
    }

    /// Points where more than two roads meet
    pub fn intersections(&self) -> Vec<Point> {
        self.graph.intersections()
    }

    /// Axis-aligned bounds of everything drawn
    pub fn bounds(&self) -> Option<(Point, Point)> {
        bounds_of(
            self.road_borders
                .iter()
                .flat_map(|seg| [seg.p1, seg.p2])
                .chain(self.buildings.iter().flat_map(|b| b.base.points().iter().copied()))
                .chain(self.trees.iter().map(|t| t.center)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// Plus-shaped crossing
    fn crossing() -> Graph {
        let center = p(0.0, 0.0);
        let arms = [p(500.0, 0.0), p(-500.0, 0.0), p(0.0, 500.0), p(0.0, -500.0)];
        let mut graph = Graph::default();
        graph.add_point(center);
        for arm in arms {
            graph.add_point(arm);
            graph.add_segment(Segment::new(center, arm));
        }
        graph
    }

    #[test]
    fn test_empty_graph_generates_nothing() {
        let world = World::new(Graph::default(), WorldSettings::default());
        assert!(world.envelopes.is_empty());
        assert!(world.road_borders.is_empty());
        assert!(world.buildings.is_empty());
        assert!(world.trees.is_empty());
        assert!(world.lane_guides.is_empty());
        assert!(world.bounds().is_none());
    }

    #[test]
    fn test_borders_stay_outside_the_road() {
        let world = World::new(crossing(), WorldSettings::default());
        assert_eq!(world.envelopes.len(), 4);
        assert!(!world.road_borders.is_empty());
        for border in &world.road_borders {
            let mid = border.midpoint();
            // Border midpoints sit on the road edge, never in the middle of the road
            for env in &world.envelopes {
                assert!(env.poly.distance_to_point(mid) < 1e-6 || !env.poly.contains_point(mid));
            }
        }
        assert_eq!(world.intersections(), vec![p(0.0, 0.0)]);
    }

    #[test]
    fn test_buildings_and_trees_avoid_roads() {
        let world = World::new(crossing(), WorldSettings::default());
        assert!(!world.buildings.is_empty());
        for building in &world.buildings {
            for env in &world.envelopes {
                assert!(!building.base.intersects_poly(&env.poly));
            }
        }
        for tree in &world.trees {
            for env in &world.envelopes {
                assert!(!env.poly.contains_point(tree.center));
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = World::new(crossing(), WorldSettings::default());
        let b = World::new(crossing(), WorldSettings::default());
        let centers = |w: &World| w.trees.iter().map(|t| t.center).collect::<Vec<_>>();
        assert_eq!(centers(&a), centers(&b));
        assert_eq!(a.road_borders, b.road_borders);
    }

    #[test]
    fn test_regenerate_only_after_edit() {
        let mut world = World::new(crossing(), WorldSettings::default());
        assert!(!world.regenerate_if_changed());

        let far = p(500.0, 500.0);
        world.graph.add_point(far);
        world.graph.add_segment(Segment::new(p(500.0, 0.0), far));
        assert!(world.regenerate_if_changed());
        assert_eq!(world.envelopes.len(), 5);
        assert!(!world.regenerate_if_changed());
    }

    #[test]
    fn test_stop_lines_from_markings() {
        let mut world = World::new(crossing(), WorldSettings::default());
        world.markings.push(Marking::new(p(0.0, 200.0), p(0.0, 1.0), 50.0, 20.0, MarkingKind::Stop));
        world.markings.push(Marking::new(p(0.0, -200.0), p(0.0, 1.0), 50.0, 20.0, MarkingKind::Crossing));
        assert_eq!(world.stop_lines().len(), 1);
        assert_eq!(world.markings_of(MarkingKind::Crossing).count(), 1);
    }

    #[test]
    fn test_corridor_through_crossing() {
        let world = World::new(crossing(), WorldSettings::default());
        let corridor = world.generate_corridor(p(-400.0, 10.0), p(10.0, 400.0)).unwrap();
        assert_eq!(corridor.skeleton.len(), 2);
        assert!(corridor.borders.len() < world.road_borders.len());
    }
}
