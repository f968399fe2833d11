//! Road Evo headless trainer
//!
//! Builds (or loads) a world, evolves a population of cars on it for a number
//! of generations and writes the best brain as JSON.

use std::path::PathBuf;

use clap::Parser;

use road_evo::consts::{MARKING_HEIGHT, MARKING_WIDTH};
use road_evo::evolution::GenerationEntry;
use road_evo::geometry::{Point, Segment};
use road_evo::persistence;
use road_evo::renderer::{LogRenderer, Renderer, Scene};
use road_evo::sim::{NeuralNetwork, run_generation};
use road_evo::world::{Marking, MarkingKind};
use road_evo::{Graph, Leaderboard, Preset, Result, Settings, Simulation, World};

/// Headless trainer - evolve car brains on a road network
#[derive(Parser, Debug)]
#[command(name = "road-evo")]
#[command(about = "Evolve self-driving car brains on a procedural road network")]
struct Args {
    /// Settings JSON (defaults are used when the file is missing)
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// Preset applied on top of the loaded settings: small, default or large
    #[arg(long)]
    preset: Option<String>,

    /// World JSON; a demo grid is generated when omitted
    #[arg(long)]
    world: Option<PathBuf>,

    /// Write the world used for training to this path
    #[arg(long)]
    save_world: Option<PathBuf>,

    /// Number of generations (overrides settings)
    #[arg(long)]
    generations: Option<u32>,

    /// Ticks per generation (overrides settings)
    #[arg(long)]
    ticks: Option<u64>,

    /// Random seed for deterministic runs (overrides settings)
    #[arg(long)]
    seed: Option<u64>,

    /// Brain to seed the first generation with
    #[arg(long)]
    brain: Option<PathBuf>,

    /// Where to write the best brain
    #[arg(long, default_value = "best_brain.json")]
    output: PathBuf,

    /// Leaderboard of past generations
    #[arg(long, default_value = "leaderboard.json")]
    leaderboard: PathBuf,
}

/// 3×3 grid of streets, 400 apart, with a start and a target marking
fn demo_world(settings: &Settings) -> World {
    const SPACING: f64 = 400.0;
    let points: Vec<Point> = (0..3)
        .flat_map(|j| (0..3).map(move |i| Point::new(i as f64 * SPACING, j as f64 * SPACING)))
        .collect();
    let at = |i: usize, j: usize| points[j * 3 + i];

    let mut segments = Vec::new();
    for j in 0..3 {
        for i in 0..2 {
            segments.push(Segment::new(at(i, j), at(i + 1, j)));
            segments.push(Segment::new(at(j, i), at(j, i + 1)));
        }
    }

    let mut world = World::new(Graph::new(points, segments), settings.world.clone());
    world.markings.push(Marking::new(
        Point::new(0.0, 700.0),
        Point::new(0.0, 1.0),
        MARKING_WIDTH,
        MARKING_HEIGHT,
        MarkingKind::Start,
    ));
    world.markings.push(Marking::new(
        Point::new(800.0, 100.0),
        Point::new(0.0, 1.0),
        MARKING_WIDTH,
        MARKING_HEIGHT,
        MarkingKind::Target,
    ));
    world
}

fn run(args: Args) -> Result<()> {
    let mut settings = Settings::load(&args.settings)?;
    if let Some(name) = &args.preset {
        match Preset::from_str(name) {
            Some(preset) => settings.apply_preset(preset),
            None => log::warn!("Unknown preset '{}', keeping {}", name, settings.preset.as_str()),
        }
    }
    if let Some(generations) = args.generations {
        settings.evolution.generations = generations;
    }
    if let Some(ticks) = args.ticks {
        settings.evolution.ticks_per_generation = ticks;
    }
    let seed = args.seed.unwrap_or(settings.world.seed);

    let world = match &args.world {
        Some(path) => persistence::load_world(path)?,
        None => demo_world(&settings),
    };
    if let Some(path) = &args.save_world {
        persistence::save_world(path, &world)?;
    }

    let generations = settings.evolution.generations;
    let max_ticks = settings.evolution.ticks_per_generation;
    let mut sim = Simulation::new(&world, settings, seed)?;
    if let Some(path) = &args.brain {
        let brain = persistence::load_brain(path)?;
        sim.populate(Some(&brain))?;
    }

    let mut board = Leaderboard::load(&args.leaderboard)?;
    let mut renderer = LogRenderer::default();
    let mut best: Option<(f64, NeuralNetwork)> = None;

    for _ in 0..generations {
        let ticks = run_generation(&mut sim, max_ticks);
        let Some(car) = sim.best_car() else {
            log::warn!("Empty population, nothing to evolve");
            break;
        };
        renderer.render(&Scene::build(&world, &sim.cars, car.position()));

        log::info!(
            "generation {}: {} ticks, best fitness {:.1}, progress {:.0}%",
            sim.generation,
            ticks,
            car.fitness,
            car.progress * 100.0
        );
        if let Some(rank) = board.add(GenerationEntry {
            generation: sim.generation,
            fitness: car.fitness,
            progress: car.progress,
        }) {
            log::info!("generation {} ranked #{}", sim.generation, rank);
        }
        if let Some(finish) = sim.finish_tick() {
            log::info!("target reached at tick {}", finish);
        }

        let improved = best.as_ref().is_none_or(|(fitness, _)| car.fitness > *fitness);
        if improved {
            if let Some(brain) = car.brain() {
                best = Some((car.fitness, brain.clone()));
            }
        }

        sim.next_generation()?;
    }

    board.save(&args.leaderboard)?;
    match best {
        Some((fitness, brain)) => {
            persistence::save_brain(&args.output, &brain)?;
            println!("Best fitness {:.1}, brain written to {}", fitness, args.output.display());
        }
        None => println!("No generations run"),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Road Evo starting...");

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
