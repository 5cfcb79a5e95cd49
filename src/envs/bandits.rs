use super::{BuildEnv, BuildEnvError, EnvStructure, Environment, StructuredEnvironment};
use crate::spaces::IndexSpace;
use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A multi-armed bandit with Bernoulli-distributed arm rewards.
///
/// Each episode is a single step: the action selects an arm and the episode
/// terminates with reward 0 or 1.
pub struct BernoulliBandit {
    arms: Vec<Bernoulli>,
    probabilities: Vec<f64>,
    rng: StdRng,
}

impl BernoulliBandit {
    /// # Panics
    /// If any probability is outside `[0, 1]` or the probability list is empty.
    pub fn new(probabilities: Vec<f64>, seed: u64) -> Self {
        assert!(!probabilities.is_empty());
        let arms = probabilities
            .iter()
            .map(|&p| Bernoulli::new(p).expect("arm probability must be in [0, 1]"))
            .collect();
        Self {
            arms,
            probabilities,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl fmt::Display for BernoulliBandit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BernoulliBandit({:?})", self.probabilities)
    }
}

impl Environment for BernoulliBandit {
    type Observation = usize;
    type Action = usize;

    fn reset(&mut self) -> usize {
        0
    }

    fn step(&mut self, action: &usize) -> (Option<usize>, f64, bool) {
        let reward = u8::from(self.arms[*action].sample(&mut self.rng)) as f64;
        (None, reward, true)
    }
}

impl StructuredEnvironment for BernoulliBandit {
    type ObservationSpace = IndexSpace;
    type ActionSpace = IndexSpace;

    fn structure(&self) -> EnvStructure<IndexSpace, IndexSpace> {
        EnvStructure {
            observation_space: IndexSpace::new(1),
            action_space: IndexSpace::new(self.arms.len()),
            reward_range: (0.0, 1.0),
            discount_factor: 1.0,
        }
    }
}

/// Configuration of a [`BernoulliBandit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BernoulliBanditConfig {
    /// Success probability of each arm.
    pub probabilities: Vec<f64>,
}

impl BuildEnv for BernoulliBanditConfig {
    type Environment = BernoulliBandit;

    fn build_env(&self, seed: u64) -> Result<BernoulliBandit, BuildEnvError> {
        if self.probabilities.is_empty() {
            return Err(BuildEnvError::InvalidConfig(
                "bandit must have at least one arm".into(),
            ));
        }
        for &p in &self.probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(BuildEnvError::InvalidConfig(format!(
                    "arm probability {} outside [0, 1]",
                    p
                )));
            }
        }
        Ok(BernoulliBandit::new(self.probabilities.clone(), seed))
    }
}

/// A multi-armed bandit with deterministic arm rewards.
pub struct DeterministicBandit {
    values: Vec<f64>,
}

impl DeterministicBandit {
    pub fn from_values(values: Vec<f64>) -> Self {
        assert!(!values.is_empty());
        Self { values }
    }
}

impl fmt::Display for DeterministicBandit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DeterministicBandit({:?})", self.values)
    }
}

impl Environment for DeterministicBandit {
    type Observation = usize;
    type Action = usize;

    fn reset(&mut self) -> usize {
        0
    }

    fn step(&mut self, action: &usize) -> (Option<usize>, f64, bool) {
        (None, self.values[*action], true)
    }
}

impl StructuredEnvironment for DeterministicBandit {
    type ObservationSpace = IndexSpace;
    type ActionSpace = IndexSpace;

    fn structure(&self) -> EnvStructure<IndexSpace, IndexSpace> {
        let min = self.values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self
            .values
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        EnvStructure {
            observation_space: IndexSpace::new(1),
            action_space: IndexSpace::new(self.values.len()),
            reward_range: (min, max),
            discount_factor: 1.0,
        }
    }
}
