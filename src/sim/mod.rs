//! Deterministic simulation module
//!
//! Everything that runs per tick lives here. This module must stay
//! deterministic:
//! - Fixed step only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod car;
pub mod controls;
pub mod network;
pub mod sensor;
pub mod state;
pub mod tick;

pub use car::Car;
pub use controls::{ControlType, Controls};
pub use network::{Level, NeuralNetwork};
pub use sensor::{Reading, Sensor, SensorKind, SensorTargets};
pub use state::{RngState, Simulation, Track};
pub use tick::{TickInput, run_generation, tick};
