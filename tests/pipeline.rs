//! Graph to world to simulation to disk and back

use std::path::PathBuf;

use road_evo::evolution::{GenerationEntry, Leaderboard};
use road_evo::geometry::{Point, Segment};
use road_evo::persistence;
use road_evo::renderer::{LogRenderer, Renderer, Scene};
use road_evo::sim::{ControlType, run_generation};
use road_evo::world::{Marking, MarkingKind};
use road_evo::{Car, Graph, Preset, Settings, Simulation, World};

fn temp(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("road_evo_it_{}_{}.json", name, std::process::id()))
}

/// T junction: a long north-south road with a side street
fn t_junction() -> World {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(0.0, -600.0);
    let c = Point::new(0.0, -1200.0);
    let d = Point::new(400.0, -600.0);
    let graph = Graph::new(
        vec![a, b, c, d],
        vec![Segment::new(a, b), Segment::new(b, c), Segment::new(b, d)],
    );
    let mut world = World::new(graph, Default::default());
    world.markings.push(Marking::new(
        Point::new(0.0, -100.0),
        Point::new(0.0, 1.0),
        50.0,
        20.0,
        MarkingKind::Start,
    ));
    world.markings.push(Marking::new(
        Point::new(0.0, -1100.0),
        Point::new(0.0, 1.0),
        50.0,
        20.0,
        MarkingKind::Target,
    ));
    world.markings.push(Marking::new(
        Point::new(0.0, -500.0),
        Point::new(0.0, 1.0),
        50.0,
        10.0,
        MarkingKind::Stop,
    ));
    world
}

#[test]
fn world_generation_produces_every_layer() {
    let world = t_junction();
    assert_eq!(world.envelopes.len(), 3);
    assert!(!world.road_borders.is_empty());
    assert!(!world.lane_guides.is_empty());
    assert_eq!(world.intersections(), vec![Point::new(0.0, -600.0)]);
    assert_eq!(world.stop_lines().len(), 1);

    // Nothing stands on the road
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
fn world_survives_a_save_load_cycle() {
    let world = t_junction();
    let path = temp("world");
    persistence::save_world(&path, &world).unwrap();
    let loaded = persistence::load_world(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.graph.points(), world.graph.points());
    assert_eq!(loaded.road_borders.len(), world.road_borders.len());
    assert_eq!(loaded.buildings.len(), world.buildings.len());
    assert_eq!(loaded.trees.len(), world.trees.len());
    assert_eq!(loaded.markings.len(), world.markings.len());
}

#[test]
fn training_loop_is_deterministic() {
    let world = t_junction();
    let settings = Settings::from_preset(Preset::Small);

    let train = || {
        let mut sim = Simulation::new(&world, settings.clone(), 21).unwrap();
        let mut board = Leaderboard::new();
        for _ in 0..3 {
            run_generation(&mut sim, 300);
            let best = sim.best_car().unwrap();
            board.add(GenerationEntry {
                generation: sim.generation,
                fitness: best.fitness,
                progress: best.progress,
            });
            sim.next_generation().unwrap();
        }
        (sim, board)
    };

    let (a, board_a) = train();
    let (b, board_b) = train();
    assert_eq!(a.generation, 3);
    assert_eq!(board_a.entries, board_b.entries);
    assert_eq!(a.cars[0].brain(), b.cars[0].brain());
    assert!(a.track.corridor.is_some());
}

#[test]
fn best_brain_drives_a_loaded_car() {
    let world = t_junction();
    let settings = Settings::from_preset(Preset::Small);
    let mut sim = Simulation::new(&world, settings.clone(), 5).unwrap();
    run_generation(&mut sim, 200);
    let brain = sim.best_car().and_then(Car::brain).cloned().unwrap();

    let brain_path = temp("brain");
    persistence::save_brain(&brain_path, &brain).unwrap();
    let loaded = persistence::load_brain(&brain_path).unwrap();
    let _ = std::fs::remove_file(&brain_path);
    assert_eq!(loaded, brain);

    let mut rng = road_evo::sim::RngState::new(1).next_rng();
    let mut car = Car::from_settings(
        sim.track.spawn,
        sim.track.heading,
        ControlType::Ai,
        &settings,
        &mut rng,
    )
    .unwrap();
    car.set_brain(loaded).unwrap();

    let car_path = temp("car");
    persistence::save_car(&car_path, &car).unwrap();
    let restored = persistence::load_car(&car_path).unwrap();
    let _ = std::fs::remove_file(&car_path);
    assert_eq!(restored.brain(), Some(&brain));
    assert_eq!(restored.sensors().len(), 1);
}

#[test]
fn scene_reflects_population() {
    let world = t_junction();
    let mut sim = Simulation::new(&world, Settings::from_preset(Preset::Small), 8).unwrap();
    sim.add_traffic(Point::new(5.0, -300.0), 0.0);
    run_generation(&mut sim, 50);

    let scene = Scene::build(&world, &sim.cars, sim.track.spawn);
    assert_eq!(scene.cars.len(), 20);
    assert!(scene.cars.iter().all(|c| c.hitbox.len() == 4));
    assert!(scene.items.windows(2).all(|w| w[0].distance >= w[1].distance));

    let mut renderer = LogRenderer::default();
    renderer.render(&scene);
    assert_eq!(renderer.frames, 1);
}
