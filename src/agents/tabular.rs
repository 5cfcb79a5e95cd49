//! Tabular agents
use super::{save_model_json, Actor, Agent, AgentBuilder, BuildAgentError, ModelStore, Step};
use crate::envs::EnvStructure;
use crate::error::StorageError;
use crate::logging::Logger;
use crate::spaces::{FiniteSpace, SampleSpace};
use ndarray::{Array, Array2, Axis};
use ndarray_stats::QuantileExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Configuration of an epsilon-greedy tabular Q learning agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabularQLearningAgentConfig {
    /// Probability of taking a random action.
    pub exploration_rate: f64,
}

impl TabularQLearningAgentConfig {
    pub const fn new(exploration_rate: f64) -> Self {
        Self { exploration_rate }
    }
}

impl Default for TabularQLearningAgentConfig {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl<OS, AS> AgentBuilder<OS, AS> for TabularQLearningAgentConfig
where
    OS: FiniteSpace,
    AS: FiniteSpace + SampleSpace,
{
    type Agent = TabularQLearningAgent<OS, AS>;

    fn build(
        &self,
        structure: EnvStructure<OS, AS>,
        seed: u64,
    ) -> Result<Self::Agent, BuildAgentError> {
        Ok(TabularQLearningAgent::new(
            structure.observation_space,
            structure.action_space,
            structure.discount_factor,
            self.exploration_rate,
            seed,
        ))
    }
}

/// An epsilon-greedy tabular Q learning agent.
#[derive(Debug)]
pub struct TabularQLearningAgent<OS, AS> {
    pub observation_space: OS,
    pub action_space: AS,
    pub discount_factor: f64,
    pub exploration_rate: f64,
    pub state_action_counts: Array2<u32>,
    pub state_action_values: Array2<f64>,

    rng: StdRng,
}

impl<OS, AS> TabularQLearningAgent<OS, AS>
where
    OS: FiniteSpace,
    AS: FiniteSpace,
{
    pub fn new(
        observation_space: OS,
        action_space: AS,
        discount_factor: f64,
        exploration_rate: f64,
        seed: u64,
    ) -> Self {
        let num_observations = observation_space.size();
        let num_actions = action_space.size();
        Self {
            observation_space,
            action_space,
            discount_factor,
            exploration_rate,
            state_action_counts: Array::from_elem((num_observations, num_actions), 0),
            state_action_values: Array::from_elem((num_observations, num_actions), 0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Set the probability of taking a random action.
    ///
    /// Set to `0.0` for greedy evaluation of a trained agent.
    pub fn set_exploration_rate(&mut self, exploration_rate: f64) {
        self.exploration_rate = exploration_rate;
    }
}

impl<OS, AS> fmt::Display for TabularQLearningAgent<OS, AS>
where
    OS: fmt::Display,
    AS: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TabularQLearningAgent({}, {}, {}, {})",
            self.observation_space, self.action_space, self.discount_factor, self.exploration_rate
        )
    }
}

impl<OS, AS> Actor<OS::Element, AS::Element> for TabularQLearningAgent<OS, AS>
where
    OS: FiniteSpace,
    AS: FiniteSpace + SampleSpace,
{
    fn act(&mut self, observation: &OS::Element) -> AS::Element {
        if self.rng.gen::<f64>() < self.exploration_rate {
            self.action_space.sample(&mut self.rng)
        } else {
            let obs_idx = self.observation_space.to_index(observation);
            // Rows are non-empty for any valid action space
            let act_idx = self
                .state_action_values
                .index_axis(Axis(0), obs_idx)
                .argmax()
                .unwrap();
            self.action_space.from_index(act_idx).unwrap()
        }
    }
}

impl<OS, AS> Agent<OS::Element, AS::Element> for TabularQLearningAgent<OS, AS>
where
    OS: FiniteSpace,
    AS: FiniteSpace + SampleSpace,
{
    fn update(&mut self, step: Step<OS::Element, AS::Element>, _logger: &mut dyn Logger) {
        let obs_idx = self.observation_space.to_index(&step.observation);
        let act_idx = self.action_space.to_index(&step.action);

        let discounted_next_value = match step.next_observation {
            None => 0.0,
            Some(next_observation) => {
                let next_obs_idx = self.observation_space.to_index(next_observation);
                self.state_action_values
                    .index_axis(Axis(0), next_obs_idx)
                    .max()
                    .unwrap()
                    * self.discount_factor
            }
        };
        let idx = (obs_idx, act_idx);
        self.state_action_counts[idx] += 1;

        let value = step.reward + discounted_next_value;
        let weight = f64::from(self.state_action_counts[idx]).recip();
        self.state_action_values[idx] *= 1.0 - weight;
        self.state_action_values[idx] += weight * value;
    }
}

impl<OS, AS> ModelStore for TabularQLearningAgent<OS, AS> {
    fn save(&self, path: &Path) -> Result<(), StorageError> {
        #[derive(Serialize)]
        struct TabularSnapshot<'a> {
            agent: &'static str,
            discount_factor: f64,
            exploration_rate: f64,
            state_action_counts: &'a Array2<u32>,
            state_action_values: &'a Array2<f64>,
        }
        save_model_json(
            path,
            &TabularSnapshot {
                agent: "tabular_q_learning",
                discount_factor: self.discount_factor,
                exploration_rate: self.exploration_rate,
                state_action_counts: &self.state_action_counts,
                state_action_values: &self.state_action_values,
            },
        )
    }
}
