//! Save/load of worlds, brains and cars
//!
//! Features:
//! - Plain JSON records (see [`records`])
//! - Validation on load: dangling graph references, degenerate polygons,
//!   ragged weight matrices and brain/sensor mismatches are rejected
//! - Nothing is partially loaded: a file either yields a full value or an error

pub mod records;

pub use records::{
    GraphRecord, MarkingRecord, NetworkRecord, PolygonRecord, TreeRecord, WorldRecord,
};

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, SimError};
use crate::sim::{Car, NeuralNetwork};
use crate::world::World;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| {
        log::warn!("Rejected {}: {}", path.display(), e);
        SimError::Persistence(format!("{}: {}", path.display(), e))
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_world(path: impl AsRef<Path>) -> Result<World> {
    let path = path.as_ref();
    let world: World = read_json(path)?;
    log::info!(
        "Loaded world from {} ({} points, {} segments, {} markings)",
        path.display(),
        world.graph.points().len(),
        world.graph.segments().len(),
        world.markings.len()
    );
    Ok(world)
}

pub fn save_world(path: impl AsRef<Path>, world: &World) -> Result<()> {
    let path = path.as_ref();
    write_json(path, world)?;
    log::info!("World saved to {}", path.display());
    Ok(())
}

pub fn load_brain(path: impl AsRef<Path>) -> Result<NeuralNetwork> {
    let path = path.as_ref();
    let brain: NeuralNetwork = read_json(path)?;
    log::info!(
        "Loaded brain from {} ({} levels)",
        path.display(),
        brain.levels().len()
    );
    Ok(brain)
}

pub fn save_brain(path: impl AsRef<Path>, brain: &NeuralNetwork) -> Result<()> {
    let path = path.as_ref();
    write_json(path, brain)?;
    log::info!("Brain saved to {}", path.display());
    Ok(())
}

/// Load a car with its sensors and brain; the brain must fit the sensors
pub fn load_car(path: impl AsRef<Path>) -> Result<Car> {
    let path = path.as_ref();
    let car: Car = read_json(path)?;
    car.validate()?;
    log::info!("Loaded car from {}", path.display());
    Ok(car)
}

pub fn save_car(path: impl AsRef<Path>, car: &Car) -> Result<()> {
    let path = path.as_ref();
    write_json(path, car)?;
    log::info!("Car saved to {}", path.display());
    Ok(())
}
