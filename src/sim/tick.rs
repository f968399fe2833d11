//! Fixed-step simulation tick
//!
//! One tick moves traffic first, then the population against a snapshot of
//! the traffic hit-boxes, then records corridor progress.

use super::controls::{ControlType, Controls};
use super::sensor::SensorTargets;
use super::state::Simulation;
use crate::geometry::Polygon;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Controls for keyboard-driven cars
    pub keys: Option<Controls>,
}

/// Advance the simulation by one step
pub fn tick(sim: &mut Simulation, input: &TickInput) {
    sim.time_ticks += 1;

    if let Some(keys) = input.keys {
        sim.cars
            .iter_mut()
            .filter(|car| car.control_type == ControlType::Keys)
            .for_each(|car| car.controls = keys);
    }

    let road_only = SensorTargets {
        borders: &sim.track.borders,
        traffic: &[],
        markings: &[],
    };
    for car in &mut sim.traffic {
        car.update(&road_only);
    }

    let traffic: Vec<Polygon> = sim.traffic.iter().map(|car| car.polygon()).collect();
    let targets = SensorTargets {
        borders: &sim.track.borders,
        traffic: &traffic,
        markings: &sim.track.markings,
    };
    for car in &mut sim.cars {
        car.update(&targets);
    }

    sim.update_progress();

    log::trace!(
        "tick {}: {} of {} cars damaged",
        sim.time_ticks,
        sim.cars.iter().filter(|c| c.damaged()).count(),
        sim.cars.len()
    );
}

/// Tick until every car crashed or `max_ticks` elapsed; returns ticks run
pub fn run_generation(sim: &mut Simulation, max_ticks: u64) -> u64 {
    let input = TickInput::default();
    while sim.time_ticks < max_ticks && !sim.all_damaged() {
        tick(sim, &input);
    }
    sim.time_ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Segment};
    use crate::graph::Graph;
    use crate::settings::{Preset, Settings};
    use crate::world::{Marking, MarkingKind, World};

    /// Straight north-bound road with start and target markings
    fn race_world() -> World {
        let (a, b) = (Point::new(0.0, 0.0), Point::new(0.0, -2000.0));
        let mut world = World::new(Graph::new(vec![a, b], vec![Segment::new(a, b)]), Default::default());
        for (y, kind) in [(-100.0, MarkingKind::Start), (-1900.0, MarkingKind::Target)] {
            world
                .markings
                .push(Marking::new(Point::new(0.0, y), Point::new(0.0, 1.0), 50.0, 20.0, kind));
        }
        world
    }

    fn small() -> Settings {
        Settings::from_preset(Preset::Small)
    }

    #[test]
    fn test_tick_counts() {
        let mut sim = Simulation::new(&race_world(), small(), 1).unwrap();
        tick(&mut sim, &TickInput::default());
        tick(&mut sim, &TickInput::default());
        assert_eq!(sim.time_ticks, 2);
    }

    #[test]
    fn test_determinism() {
        let mut a = Simulation::new(&race_world(), small(), 99).unwrap();
        let mut b = Simulation::new(&race_world(), small(), 99).unwrap();
        for _ in 0..200 {
            tick(&mut a, &TickInput::default());
            tick(&mut b, &TickInput::default());
        }
        for (ca, cb) in a.cars.iter().zip(&b.cars) {
            assert_eq!((ca.x, ca.y, ca.angle), (cb.x, cb.y, cb.angle));
            assert_eq!(ca.damaged(), cb.damaged());
        }
    }

    #[test]
    fn test_keys_drive_keyboard_cars() {
        let mut sim = Simulation::new(&race_world(), small(), 2).unwrap();
        sim.cars[0].control_type = ControlType::Keys;
        let input = TickInput {
            keys: Some(Controls {
                forward: true,
                ..Default::default()
            }),
        };
        for _ in 0..100 {
            tick(&mut sim, &input);
        }
        let car = &sim.cars[0];
        assert!(car.y < -100.0);
        assert!(car.progress > 0.0);
        assert!(!car.damaged());
    }

    #[test]
    fn test_traffic_damages_population() {
        let mut sim = Simulation::new(&race_world(), small(), 3).unwrap();
        sim.add_traffic(Point::new(5.0, -110.0), 0.0);
        tick(&mut sim, &TickInput::default());
        assert!(sim.all_damaged());
        // Traffic never collides with the population
        assert!(!sim.traffic[0].damaged());
    }

    #[test]
    fn test_run_generation_stops_when_all_crashed() {
        let mut sim = Simulation::new(&race_world(), small(), 4).unwrap();
        sim.add_traffic(Point::new(5.0, -100.0), 0.0);
        assert_eq!(run_generation(&mut sim, 500), 1);
    }

    #[test]
    fn test_finish_tick_recorded() {
        let mut sim = Simulation::new(&race_world(), small(), 5).unwrap();
        // Past the target: progress saturates
        sim.cars[0].y = -1950.0;
        sim.update_progress();
        assert_eq!(sim.cars[0].progress, 1.0);
        assert_eq!(sim.finish_tick(), Some(0));
    }
}
