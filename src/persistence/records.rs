//! Plain JSON record shapes
//!
//! Runtime types convert through these so that what lands on disk stays
//! the flat `{x,y}` / `{p1,p2,oneWay}` / `{points}` layout, and anything
//! malformed is rejected while loading rather than later.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::geometry::{Envelope, Point, Polygon, Segment};
use crate::graph::{Graph, OneWayConvention};
use crate::settings::WorldSettings;
use crate::sim::network::{Level, NeuralNetwork};
use crate::world::{Building, Marking, MarkingKind, Tree, TreeKind, World};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonRecord {
    pub points: Vec<Point>,
}

impl TryFrom<PolygonRecord> for Polygon {
    type Error = SimError;

    fn try_from(record: PolygonRecord) -> Result<Self, Self::Error> {
        Polygon::try_new(record.points)
    }
}

impl From<Polygon> for PolygonRecord {
    fn from(poly: Polygon) -> Self {
        Self {
            points: poly.points().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRecord {
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub convention: OneWayConvention,
}

impl TryFrom<GraphRecord> for Graph {
    type Error = SimError;

    fn try_from(record: GraphRecord) -> Result<Self, Self::Error> {
        let graph = Graph::new(record.points, record.segments).with_convention(record.convention);
        graph.validate()?;
        Ok(graph)
    }
}

impl From<Graph> for GraphRecord {
    fn from(graph: Graph) -> Self {
        Self {
            points: graph.points,
            segments: graph.segments,
            convention: graph.convention,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub levels: Vec<Level>,
}

impl TryFrom<NetworkRecord> for NeuralNetwork {
    type Error = SimError;

    fn try_from(record: NetworkRecord) -> Result<Self, Self::Error> {
        NeuralNetwork::from_levels(record.levels)
    }
}

impl From<NeuralNetwork> for NetworkRecord {
    fn from(network: NeuralNetwork) -> Self {
        Self {
            levels: network.levels().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkingRecord {
    pub center: Point,
    pub direction_vector: Point,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub kind: MarkingKind,
}

impl From<MarkingRecord> for Marking {
    fn from(r: MarkingRecord) -> Self {
        Marking::new(r.center, r.direction_vector, r.width, r.height, r.kind)
    }
}

impl From<Marking> for MarkingRecord {
    fn from(m: Marking) -> Self {
        Self {
            center: m.center,
            direction_vector: m.direction,
            width: m.width,
            height: m.height,
            kind: m.kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRecord {
    pub center: Point,
    pub size: f64,
    #[serde(default)]
    pub kind: TreeKind,
    #[serde(default = "default_tree_height")]
    pub height: f64,
}

fn default_tree_height() -> f64 {
    WorldSettings::default().tree_height
}

impl From<TreeRecord> for Tree {
    fn from(r: TreeRecord) -> Self {
        Tree::new(r.center, r.size, r.kind, r.height)
    }
}

impl From<Tree> for TreeRecord {
    fn from(t: Tree) -> Self {
        Self {
            center: t.center,
            size: t.size,
            kind: t.kind,
            height: t.height,
        }
    }
}

/// Saved world: the graph plus every derived layer as it was generated
///
/// A record missing any derived layer is regenerated from its graph on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldRecord {
    pub graph: Graph,
    #[serde(default)]
    pub settings: WorldSettings,
    #[serde(default)]
    pub envelopes: Option<Vec<Envelope>>,
    #[serde(default)]
    pub road_borders: Option<Vec<Segment>>,
    #[serde(default)]
    pub buildings: Option<Vec<Building>>,
    #[serde(default)]
    pub trees: Option<Vec<Tree>>,
    #[serde(default)]
    pub lane_guides: Option<Vec<Segment>>,
    #[serde(default)]
    pub markings: Vec<Marking>,
}

impl From<WorldRecord> for World {
    fn from(r: WorldRecord) -> Self {
        let generated_hash = r.graph.hash();
        match (r.envelopes, r.road_borders, r.buildings, r.trees, r.lane_guides) {
            (Some(envelopes), Some(road_borders), Some(buildings), Some(trees), Some(lane_guides)) => World {
                graph: r.graph,
                settings: r.settings,
                envelopes,
                road_borders,
                buildings,
                trees,
                lane_guides,
                markings: r.markings,
                generated_hash,
            },
            _ => {
                log::info!("World record lacks derived layers, regenerating");
                let mut world = World {
                    graph: r.graph,
                    settings: r.settings,
                    envelopes: Vec::new(),
                    road_borders: Vec::new(),
                    buildings: Vec::new(),
                    trees: Vec::new(),
                    lane_guides: Vec::new(),
                    markings: r.markings,
                    generated_hash,
                };
                world.generate();
                world
            }
        }
    }
}

impl From<World> for WorldRecord {
    fn from(w: World) -> Self {
        Self {
            graph: w.graph,
            settings: w.settings,
            envelopes: Some(w.envelopes),
            road_borders: Some(w.road_borders),
            buildings: Some(w.buildings),
            trees: Some(w.trees),
            lane_guides: Some(w.lane_guides),
            markings: w.markings,
        }
    }
}
