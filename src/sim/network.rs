//! Feed-forward control network
//!
//! Step activation, no training: brains improve only through random
//! perturbation between generations.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::lerp;
use crate::persistence::NetworkRecord;

/// One fully connected layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// `weights[input][output]`
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl Level {
    /// Random weights and biases in [-1, 1]
    pub fn new<R: Rng + ?Sized>(input_count: usize, output_count: usize, rng: &mut R) -> Self {
        let weights = (0..input_count)
            .map(|_| {
                (0..output_count)
                    .map(|_| rng.random_range(-1.0..=1.0))
                    .collect()
            })
            .collect();
        let biases = (0..output_count)
            .map(|_| rng.random_range(-1.0..=1.0))
            .collect();
        Self { weights, biases }
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.biases.len()
    }

    /// Output `i` fires (1.0) when the weighted input sum exceeds `biases[i]`
    pub fn feed_forward(&self, inputs: &[f64]) -> Vec<f64> {
        debug_assert_eq!(inputs.len(), self.input_count());
        self.biases
            .iter()
            .enumerate()
            .map(|(i, &bias)| {
                let sum: f64 = inputs
                    .iter()
                    .zip(&self.weights)
                    .map(|(input, row)| input * row[i])
                    .sum();
                if sum > bias { 1.0 } else { 0.0 }
            })
            .collect()
    }

    fn mutate<R: Rng + ?Sized>(&mut self, amount: f64, rng: &mut R) {
        for bias in &mut self.biases {
            *bias = lerp(*bias, rng.random_range(-1.0..=1.0), amount);
        }
        for row in &mut self.weights {
            for weight in row {
                *weight = lerp(*weight, rng.random_range(-1.0..=1.0), amount);
            }
        }
    }
}

/// Chain of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRecord", into = "NetworkRecord")]
pub struct NeuralNetwork {
    levels: Vec<Level>,
}

impl NeuralNetwork {
    /// Random network with the given layer sizes (`[inputs, hidden.., outputs]`)
    pub fn new<R: Rng + ?Sized>(neuron_counts: &[usize], rng: &mut R) -> Result<Self> {
        if neuron_counts.len() < 2 {
            return Err(SimError::NetworkTopology(neuron_counts.len()));
        }
        let levels = neuron_counts
            .windows(2)
            .map(|pair| Level::new(pair[0], pair[1], rng))
            .collect();
        Ok(Self { levels })
    }

    /// Wrap existing levels, checking that consecutive sizes line up
    pub fn from_levels(levels: Vec<Level>) -> Result<Self> {
        if levels.is_empty() {
            return Err(SimError::NetworkTopology(0));
        }
        for (i, level) in levels.iter().enumerate() {
            if level.weights.iter().any(|row| row.len() != level.output_count()) {
                return Err(SimError::Persistence(format!(
                    "level {i} has a ragged weight matrix"
                )));
            }
        }
        for pair in levels.windows(2) {
            if pair[0].output_count() != pair[1].input_count() {
                return Err(SimError::NetworkShape {
                    expected: pair[1].input_count(),
                    actual: pair[0].output_count(),
                });
            }
        }
        Ok(Self { levels })
    }

    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn input_count(&self) -> usize {
        self.levels.first().map_or(0, Level::input_count)
    }

    pub fn output_count(&self) -> usize {
        self.levels.last().map_or(0, Level::output_count)
    }

    pub fn feed_forward(&self, inputs: &[f64]) -> Vec<f64> {
        let mut signal = inputs.to_vec();
        for level in &self.levels {
            signal = level.feed_forward(&signal);
        }
        signal
    }

    /// Pull every weight and bias toward a fresh random value by `amount`
    /// (clamped to [0, 1]); zero leaves the network untouched
    pub fn mutate<R: Rng + ?Sized>(&mut self, amount: f64, rng: &mut R) {
        let amount = amount.clamp(0.0, 1.0);
        if amount == 0.0 {
            return;
        }
        for level in &mut self.levels {
            level.mutate(amount, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_step_activation() {
        let level = Level {
            weights: vec![vec![1.0]],
            biases: vec![0.5],
        };
        assert_eq!(level.feed_forward(&[1.0]), vec![1.0]);
        assert_eq!(level.feed_forward(&[0.4]), vec![0.0]);
        // Strictly greater than the bias
        assert_eq!(level.feed_forward(&[0.5]), vec![0.0]);
    }

    #[test]
    fn test_topology() {
        let mut rng = Pcg32::seed_from_u64(1);
        let net = NeuralNetwork::new(&[5, 6, 4], &mut rng).unwrap();
        assert_eq!(net.levels().len(), 2);
        assert_eq!(net.input_count(), 5);
        assert_eq!(net.output_count(), 4);
        let out = net.feed_forward(&[0.0, 0.2, 0.9, 0.0, 1.0]);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|&v| v == 0.0 || v == 1.0));

        assert!(matches!(
            NeuralNetwork::new(&[3], &mut rng),
            Err(SimError::NetworkTopology(1))
        ));
    }

    #[test]
    fn test_same_seed_same_network() {
        let a = NeuralNetwork::new(&[3, 4, 2], &mut Pcg32::seed_from_u64(9)).unwrap();
        let b = NeuralNetwork::new(&[3, 4, 2], &mut Pcg32::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mutate_zero_is_identity() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut net = NeuralNetwork::new(&[4, 3], &mut rng).unwrap();
        let before = net.clone();
        net.mutate(0.0, &mut rng);
        assert_eq!(net, before);
    }

    #[test]
    fn test_two_input_step_example() {
        let level = Level {
            weights: vec![vec![1.0], vec![1.0]],
            biases: vec![0.5],
        };
        assert_eq!(level.feed_forward(&[1.0, 1.0]), vec![1.0]);
        assert_eq!(level.feed_forward(&[0.0, 0.0]), vec![0.0]);
    }

    #[test]
    fn test_mutate_full_forgets_previous_values() {
        let mut a = NeuralNetwork::new(&[4, 3], &mut Pcg32::seed_from_u64(3)).unwrap();
        let mut b = NeuralNetwork::new(&[4, 3], &mut Pcg32::seed_from_u64(30)).unwrap();
        assert_ne!(a, b);

        a.mutate(1.0, &mut Pcg32::seed_from_u64(77));
        b.mutate(1.0, &mut Pcg32::seed_from_u64(77));

        let values = |net: &NeuralNetwork| -> Vec<f64> {
            net.levels()
                .iter()
                .flat_map(|l| l.biases.iter().chain(l.weights.iter().flatten()).copied().collect::<Vec<_>>())
                .collect()
        };
        for (x, y) in values(&a).iter().zip(values(&b)) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_from_levels_rejects_mismatch() {
        let a = Level {
            weights: vec![vec![0.0, 0.0]],
            biases: vec![0.0, 0.0],
        };
        let b = Level {
            weights: vec![vec![0.0]; 3],
            biases: vec![0.0],
        };
        assert!(matches!(
            NeuralNetwork::from_levels(vec![a.clone(), b]),
            Err(SimError::NetworkShape { expected: 3, actual: 2 })
        ));
        let ragged = Level {
            weights: vec![vec![0.0, 0.0], vec![0.0]],
            biases: vec![0.0, 0.0],
        };
        assert!(NeuralNetwork::from_levels(vec![ragged]).is_err());
        assert!(NeuralNetwork::from_levels(vec![a]).is_ok());
    }

    proptest! {
        #[test]
        fn prop_mutation_stays_in_range(amount in 0.0f64..=1.0, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut net = NeuralNetwork::new(&[3, 5, 2], &mut rng).unwrap();
            net.mutate(amount, &mut rng);
            for level in net.levels() {
                for &v in level.biases.iter().chain(level.weights.iter().flatten()) {
                    prop_assert!(v.abs() <= 1.0 + 1e-12);
                }
            }
        }

        #[test]
        fn prop_mutation_moves_at_most_amount(amount in 0.0f64..=1.0, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut net = NeuralNetwork::new(&[2, 2], &mut rng).unwrap();
            let before = net.clone();
            net.mutate(amount, &mut rng);
            for (old, new) in before.levels()[0].biases.iter().zip(&net.levels()[0].biases) {
                // Any two values in [-1, 1] are at most 2 apart
                prop_assert!((new - old).abs() <= 2.0 * amount + 1e-12);
            }
        }
    }
}
