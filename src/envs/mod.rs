//! Reinforcement learning environments
mod bandits;

pub use bandits::{BernoulliBandit, BernoulliBanditConfig, DeterministicBandit};

use crate::spaces::Space;
use thiserror::Error;

/// Auxiliary diagnostic values describing the most recent environment step.
///
/// Keys are environment-specific; an optical network environment reports
/// values like the request acceptance probability and the topology in use.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepInfo(Vec<(&'static str, f64)>);

impl StepInfo {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with(mut self, key: &'static str, value: f64) -> Self {
        self.0.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| *value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A reinforcement learning environment with internal state.
pub trait Environment {
    type Observation;
    type Action;

    /// Start a new episode and return its initial observation.
    fn reset(&mut self) -> Self::Observation;

    /// Take one step in the environment.
    ///
    /// # Returns
    /// * The successor observation; `None` if the successor state is terminal.
    ///   All trajectories from a terminal state yield 0 reward on each step.
    /// * The reward for this transition.
    /// * Whether this step ends the episode. Always true on a terminal state;
    ///   an episode may also end for other reasons, like a step limit.
    fn step(&mut self, action: &Self::Action) -> (Option<Self::Observation>, f64, bool);

    /// Auxiliary diagnostics describing the most recent step.
    fn step_info(&self) -> StepInfo {
        StepInfo::new()
    }
}

impl<E: Environment + ?Sized> Environment for &mut E {
    type Observation = E::Observation;
    type Action = E::Action;

    fn reset(&mut self) -> Self::Observation {
        E::reset(self)
    }

    fn step(&mut self, action: &Self::Action) -> (Option<Self::Observation>, f64, bool) {
        E::step(self, action)
    }

    fn step_info(&self) -> StepInfo {
        E::step_info(self)
    }
}

/// The external structure of an environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvStructure<OS, AS> {
    /// Space containing all possible observations.
    pub observation_space: OS,
    /// Space containing all possible actions.
    pub action_space: AS,
    /// A lower and upper bound on possible reward values.
    pub reward_range: (f64, f64),
    /// A discount factor applied to future rewards. In `[0, 1]`.
    pub discount_factor: f64,
}

/// An environment that describes its observation and action spaces.
pub trait StructuredEnvironment: Environment {
    type ObservationSpace: Space<Element = Self::Observation>;
    type ActionSpace: Space<Element = Self::Action>;

    fn structure(&self) -> EnvStructure<Self::ObservationSpace, Self::ActionSpace>;
}

/// Build environment instances from a configuration.
///
/// Replaces ambient environment registries; everything an environment needs
/// is passed in explicitly so multiple runs can coexist in one process.
pub trait BuildEnv {
    type Environment: Environment;

    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError>;
}

/// Error building an environment.
#[derive(Error, Debug)]
pub enum BuildEnvError {
    #[error("invalid environment configuration: {0}")]
    InvalidConfig(String),
}
