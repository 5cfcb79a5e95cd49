//! Reinforcement learning agents
mod random;
mod tabular;

pub use random::RandomAgent;
pub use tabular::{TabularQLearningAgent, TabularQLearningAgentConfig};

use crate::envs::EnvStructure;
use crate::error::StorageError;
use crate::logging::Logger;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Description of an environment step
pub struct Step<'a, O, A> {
    /// The initial observation.
    pub observation: O,
    /// The action taken from the initial state given the initial observation.
    pub action: A,
    /// The resulting reward.
    pub reward: f64,
    /// The resulting successor observation; is None if the successor state is
    /// terminal. All trajectories from a terminal state have 0 reward on each
    /// step.
    pub next_observation: Option<&'a O>,
    /// Whether this step ends the episode.
    /// An episode is always done if it reaches a terminal state.
    /// An episode may be done for other reasons, like a step limit.
    pub episode_done: bool,
}

/// An actor that produces actions given observations.
pub trait Actor<O, A> {
    /// Choose an action in the environment.
    ///
    /// Must be called sequentially within an episode.
    fn act(&mut self, observation: &O) -> A;

    /// Reset any internal episode state. Called at the start of each episode.
    fn reset(&mut self) {}
}

/// A learning agent.
///
/// Can interact with an environment and learns from the interaction.
pub trait Agent<O, A>: Actor<O, A> {
    /// Update the agent based on the most recent action.
    ///
    /// # Args
    /// * `step` - The environment step resulting from the most recent call to
    ///   [`Actor::act`].
    /// * `logger` - A logger for update statistics.
    fn update(&mut self, step: Step<O, A>, logger: &mut dyn Logger);
}

/// A model whose full state can be persisted to disk.
pub trait ModelStore {
    /// Serialize full model state under `path`, overwriting any previous
    /// artifact there.
    ///
    /// `path` is a directory; it is created if it does not exist.
    fn save(&self, path: &Path) -> Result<(), StorageError>;
}

/// Build agent instances for a given environment structure.
pub trait AgentBuilder<OS, AS> {
    type Agent;

    fn build(
        &self,
        structure: EnvStructure<OS, AS>,
        seed: u64,
    ) -> Result<Self::Agent, BuildAgentError>;
}

/// Error building an agent.
#[derive(Error, Debug)]
pub enum BuildAgentError {
    #[error("agent incompatible with environment: {0}")]
    InvalidEnvironment(String),
}

/// Name of the serialized model file within a save directory.
pub const MODEL_FILE: &str = "model.json";

/// Write a model snapshot as JSON under `dir`, atomically.
///
/// Writes to a temporary file in `dir` then renames into place so an
/// interrupted save never leaves a partial artifact at the final path.
pub(crate) fn save_model_json<T: Serialize>(dir: &Path, snapshot: &T) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
        path: dir.to_owned(),
        source,
    })?;
    let data = serde_json::to_vec_pretty(snapshot)?;
    let target = dir.join(MODEL_FILE);
    let staging = dir.join(format!("{}.tmp", MODEL_FILE));
    fs::write(&staging, data).map_err(|source| StorageError::WriteFile {
        path: staging.clone(),
        source,
    })?;
    fs::rename(&staging, &target).map_err(|source| StorageError::WriteFile {
        path: target.clone(),
        source,
    })?;
    Ok(())
}
