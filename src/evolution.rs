//! Generation bookkeeping and brain selection
//!
//! The leaderboard keeps the best generations of a training run, persisted
//! as JSON next to the saved brain.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::NeuralNetwork;

/// Maximum number of generations to keep
pub const MAX_ENTRIES: usize = 10;

/// Outcome of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationEntry {
    pub generation: u32,
    /// Fitness of the best car
    pub fitness: f64,
    /// Corridor progress of the best car (0 without a corridor)
    #[serde(default)]
    pub progress: f64,
}

/// Best generations of a training run, sorted descending by fitness
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<GenerationEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a fitness makes it onto the board
    pub fn qualifies(&self, fitness: f64) -> bool {
        if fitness <= 0.0 || !fitness.is_finite() {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| fitness > e.fitness)
    }

    /// Rank a fitness would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, fitness: f64) -> Option<usize> {
        if !self.qualifies(fitness) {
            return None;
        }
        let rank = self.entries.iter().position(|e| fitness > e.fitness);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a generation; returns the rank achieved or None
    pub fn add(&mut self, entry: GenerationEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.fitness)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&GenerationEntry> {
        self.entries.first()
    }

    /// Load a leaderboard; a missing file yields an empty board
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No leaderboard at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let board: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        log::info!("Loaded {} leaderboard entries", board.entries.len());
        Ok(board)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Brains for the next population: an exact copy of `best` followed by
/// `count - 1` copies mutated by `amount`
pub fn next_generation<R: Rng + ?Sized>(
    best: &NeuralNetwork,
    count: usize,
    amount: f64,
    rng: &mut R,
) -> Vec<NeuralNetwork> {
    (0..count)
        .map(|i| {
            let mut brain = best.clone();
            if i > 0 {
                brain.mutate(amount, rng);
            }
            brain
        })
        .collect()
}
