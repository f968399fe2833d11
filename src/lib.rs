//! Road Evo - procedural road networks driven by evolved cars
//!
//! Core modules:
//! - `geometry`: Points, segments, polygons, envelopes and polygon union
//! - `graph`: Road skeleton graph with shortest-path search
//! - `world`: World generation (road borders, lane guides, buildings, trees, markings)
//! - `sim`: Deterministic simulation (sensors, car kinematics, neural network)
//! - `evolution`: Generation bookkeeping and brain selection
//! - `persistence`: Save/load of worlds and brains as plain JSON records
//! - `renderer`: Per-frame scene handoff to an external renderer
//! - `settings`: Data-driven tuning

pub mod error;
pub mod evolution;
pub mod geometry;
pub mod graph;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod world;

pub use error::{Result, SimError};
pub use evolution::Leaderboard;
pub use geometry::{Envelope, Point, Polygon, Segment};
pub use graph::Graph;
pub use settings::{Preset, Settings};
pub use sim::{Car, NeuralNetwork, Sensor, Simulation};
pub use world::World;

/// Engine configuration constants
pub mod consts {
    /// Determinant threshold below which two segments are treated as parallel
    pub const INTERSECTION_EPSILON: f64 = 0.001;
    /// Reference point for point-in-polygon parity tests.
    /// Must stay outside every world the generator can produce.
    pub const OUTER_POINT: (f64, f64) = (-1.0e6, -1.0e6);

    /// Road defaults
    pub const ROAD_WIDTH: f64 = 100.0;
    pub const ROAD_ROUNDNESS: u32 = 10;

    /// Building defaults
    pub const BUILDING_WIDTH: f64 = 150.0;
    pub const BUILDING_MIN_LENGTH: f64 = 150.0;
    pub const BUILDING_SPACING: f64 = 50.0;
    /// Tolerance when comparing building clearance against the spacing
    pub const BUILDING_CLEARANCE_EPSILON: f64 = 0.001;

    /// Tree defaults
    pub const TREE_SIZE: f64 = 160.0;
    /// Consecutive rejected samples before tree placement gives up
    pub const TREE_MAX_TRIES: u32 = 100;
    /// Trees must sit within this multiple of their size from some polygon
    pub const TREE_CLOSENESS_FACTOR: f64 = 2.0;

    /// Car defaults (pixels, pixels/tick)
    pub const CAR_WIDTH: f64 = 30.0;
    pub const CAR_HEIGHT: f64 = 50.0;
    pub const CAR_ACCELERATION: f64 = 0.2;
    pub const CAR_FRICTION: f64 = 0.05;
    pub const CAR_MAX_SPEED: f64 = 3.0;
    /// Heading change per tick while steering (radians)
    pub const CAR_TURN_RATE: f64 = 0.03;

    /// Sensor defaults
    pub const SENSOR_RAY_COUNT: usize = 5;
    pub const SENSOR_RAY_LENGTH: f64 = 150.0;
    pub const SENSOR_RAY_SPREAD: f64 = std::f64::consts::FRAC_PI_2;

    /// Network defaults
    pub const HIDDEN_NEURONS: usize = 6;
    /// forward, left, right, reverse
    pub const CONTROL_OUTPUTS: usize = 4;

    /// Marking defaults
    pub const MARKING_WIDTH: f64 = 50.0;
    pub const MARKING_HEIGHT: f64 = 20.0;
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
