//! Simulation state
//!
//! The driver owns the cars and a snapshot of the track geometry they drive
//! on. World regeneration does not touch a running simulation; call
//! [`Simulation::set_track`] to pick up new geometry.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::car::Car;
use super::controls::ControlType;
use super::network::NeuralNetwork;
use crate::error::Result;
use crate::evolution;
use crate::geometry::{Point, Segment};
use crate::settings::Settings;
use crate::world::{Corridor, MarkingKind, World};

/// Spawn point used when the world has no start marking
const DEFAULT_SPAWN: Point = Point::new(100.0, 100.0);
const DEFAULT_DIRECTION: Point = Point::new(0.0, -1.0);

/// Seeded RNG state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Fresh generator for the next stream; every call yields a different,
    /// reproducible sequence
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Where the population starts and what it drives on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    pub borders: Vec<Segment>,
    /// Stop and yield lines seen by the sensors
    pub markings: Vec<Segment>,
    /// Present when the world has both a start and a target marking
    pub corridor: Option<Corridor>,
    pub spawn: Point,
    pub heading: f64,
}

impl Track {
    /// Road borders of the whole world, or just the start-to-target
    /// corridor when both markings exist
    pub fn from_world(world: &World) -> Self {
        let start = world.markings_of(MarkingKind::Start).next();
        let target = world.markings_of(MarkingKind::Target).next();

        let (spawn, heading) = start.map_or(
            (DEFAULT_SPAWN, -DEFAULT_DIRECTION.angle() + std::f64::consts::FRAC_PI_2),
            |m| (m.center, m.heading()),
        );

        let corridor = match (start, target) {
            (Some(s), Some(t)) => world.generate_corridor(s.center, t.center),
            _ => None,
        };
        let borders = corridor
            .as_ref()
            .map_or_else(|| world.road_borders.clone(), |c| c.borders.clone());

        Self {
            borders,
            markings: world.stop_lines(),
            corridor,
            spawn,
            heading,
        }
    }
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub seed: u64,
    pub rng_state: RngState,
    pub settings: Settings,
    pub track: Track,
    /// Generation index (0-based)
    pub generation: u32,
    /// Ticks since the generation started
    pub time_ticks: u64,
    /// Population under evaluation, in spawn order
    pub cars: Vec<Car>,
    /// Scripted traffic the population must avoid
    pub traffic: Vec<Car>,
    /// Where each traffic car starts, in `traffic` order
    traffic_spawns: Vec<(Point, f64)>,
}

impl Simulation {
    /// Spawn a random population on `world`
    pub fn new(world: &World, settings: Settings, seed: u64) -> Result<Self> {
        let mut sim = Self {
            seed,
            rng_state: RngState::new(seed),
            settings,
            track: Track::from_world(world),
            generation: 0,
            time_ticks: 0,
            cars: Vec::new(),
            traffic: Vec::new(),
            traffic_spawns: Vec::new(),
        };
        sim.populate(None)?;
        Ok(sim)
    }

    /// Swap in new track geometry, e.g. after the world was regenerated
    pub fn set_track(&mut self, world: &World) {
        self.track = Track::from_world(world);
    }

    /// Respawn the population. With a `best` brain, car 0 gets an exact
    /// copy and the rest get mutated copies; otherwise all brains are random.
    pub fn populate(&mut self, best: Option<&NeuralNetwork>) -> Result<()> {
        let mut rng = self.rng_state.next_rng();
        let count = self.settings.evolution.population;

        let mut cars = Vec::with_capacity(count);
        for _ in 0..count {
            cars.push(Car::from_settings(
                self.track.spawn,
                self.track.heading,
                ControlType::Ai,
                &self.settings,
                &mut rng,
            )?);
        }

        if let Some(best) = best {
            let brains =
                evolution::next_generation(best, count, self.settings.evolution.mutation, &mut rng);
            for (car, brain) in cars.iter_mut().zip(brains) {
                car.set_brain(brain)?;
            }
        }

        self.cars = cars;
        self.traffic = self
            .traffic_spawns
            .iter()
            .map(|&(position, heading)| Car::new(position, heading, &self.settings.car, ControlType::Dummy))
            .collect();
        self.time_ticks = 0;
        log::debug!("spawned {} cars at ({}, {})", count, self.track.spawn.x, self.track.spawn.y);
        Ok(())
    }

    /// Add a forward-driving obstacle car
    pub fn add_traffic(&mut self, position: Point, heading: f64) {
        self.traffic_spawns.push((position, heading));
        self.traffic
            .push(Car::new(position, heading, &self.settings.car, ControlType::Dummy));
    }

    /// Car that drove the farthest (first one on ties)
    pub fn best_car(&self) -> Option<&Car> {
        self.cars.iter().fold(None, |best: Option<&Car>, car| match best {
            Some(b) if b.fitness >= car.fitness => Some(b),
            _ => Some(car),
        })
    }

    /// Whether every car has crashed
    pub fn all_damaged(&self) -> bool {
        self.cars.iter().all(Car::damaged)
    }

    /// Earliest tick at which any car reached the end of the corridor
    pub fn finish_tick(&self) -> Option<u64> {
        self.cars.iter().filter_map(|c| c.finish_tick).min()
    }

    /// Record corridor progress for every car
    pub fn update_progress(&mut self) {
        let Some(corridor) = &self.track.corridor else {
            return;
        };
        for (i, car) in self.cars.iter_mut().enumerate() {
            car.progress = corridor.progress(car.position());
            if car.progress >= 1.0 && car.finish_tick.is_none() {
                car.finish_tick = Some(self.time_ticks);
                log::info!("car {} finished at tick {}", i, self.time_ticks);
            }
        }
    }

    /// Seed the next generation from the current best car
    pub fn next_generation(&mut self) -> Result<()> {
        let best = self.best_car().and_then(Car::brain).cloned();
        self.generation += 1;
        self.populate(best.as_ref())
    }
}
