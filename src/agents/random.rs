use super::{save_model_json, Actor, Agent, ModelStore, Step};
use crate::error::StorageError;
use crate::logging::Logger;
use crate::spaces::SampleSpace;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// An agent that always acts randomly.
pub struct RandomAgent<AS> {
    action_space: AS,
    rng: StdRng,
}

impl<AS> RandomAgent<AS> {
    pub fn new(action_space: AS, seed: u64) -> Self {
        Self {
            action_space,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<O, AS: SampleSpace> Actor<O, AS::Element> for RandomAgent<AS> {
    fn act(&mut self, _observation: &O) -> AS::Element {
        self.action_space.sample(&mut self.rng)
    }
}

impl<O, AS: SampleSpace> Agent<O, AS::Element> for RandomAgent<AS> {
    fn update(&mut self, _step: Step<O, AS::Element>, _logger: &mut dyn Logger) {}
}

impl<AS: Serialize> ModelStore for RandomAgent<AS> {
    fn save(&self, path: &Path) -> Result<(), StorageError> {
        #[derive(Serialize)]
        struct RandomSnapshot<'a, AS> {
            agent: &'static str,
            action_space: &'a AS,
        }
        save_model_json(
            path,
            &RandomSnapshot {
                agent: "random",
                action_space: &self.action_space,
            },
        )
    }
}

impl<AS: fmt::Display> fmt::Display for RandomAgent<AS> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RandomAgent({})", self.action_space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{IndexSpace, Space};

    #[test]
    fn acts_within_space() {
        let space = IndexSpace::new(3);
        let mut agent = RandomAgent::new(space, 0);
        for _ in 0..100 {
            let action: usize = agent.act(&0usize);
            assert!(space.contains(&action));
        }
    }

    #[test]
    fn save_writes_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let agent = RandomAgent::new(IndexSpace::new(2), 0);
        agent.save(dir.path()).unwrap();
        assert!(dir.path().join(super::super::MODEL_FILE).is_file());
    }
}
