//! Training and evaluation loops.
use crate::agents::{Actor, Agent, Step};
use crate::envs::Environment;
use crate::hooks::{StepStatus, TrainingHook};
use crate::logging::{Event, Logger};

/// Train an agent in an environment for up to `max_steps` environment steps.
///
/// Runs episodes back-to-back, updating the agent after every step and
/// invoking `hook` once per step after the update. Training stops once
/// `max_steps` steps have been taken or the hook requests a stop.
pub fn learn<E, A, H>(
    env: &mut E,
    agent: &mut A,
    max_steps: u64,
    hook: &mut H,
    logger: &mut dyn Logger,
) where
    E: Environment + ?Sized,
    A: Agent<E::Observation, E::Action>,
    H: TrainingHook<A> + ?Sized,
{
    let mut num_timesteps = 0;
    'training: loop {
        agent.reset();
        let mut observation = env.reset();
        let mut episode_reward = 0.0;
        let mut episode_length = 0u64;
        loop {
            let action = agent.act(&observation);
            let (next_observation, reward, episode_done) = env.step(&action);
            num_timesteps += 1;
            episode_reward += reward;
            episode_length += 1;

            let _ = logger.log(Event::Step, "reward", reward.into());
            logger.done(Event::Step);

            agent.update(
                Step {
                    observation,
                    action,
                    reward,
                    next_observation: next_observation.as_ref(),
                    episode_done,
                },
                logger,
            );

            let status = StepStatus {
                steps_seen: num_timesteps,
                num_timesteps,
                episode_done,
            };
            let keep_going = hook.on_step(&*agent, &status, logger);

            if episode_done {
                let _ = logger.log(Event::Episode, "reward", episode_reward.into());
                let _ = logger.log(Event::Episode, "length", (episode_length as f64).into());
                logger.done(Event::Episode);
            }
            if !keep_going || num_timesteps >= max_steps {
                break 'training;
            }
            if episode_done {
                break;
            }
            observation = match next_observation {
                Some(next) => next,
                None => break,
            };
        }
    }
}

/// Statistics from evaluating an actor over complete episodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalSummary {
    pub num_episodes: u64,
    pub mean_reward: f64,
    pub mean_length: f64,
}

/// Evaluate an actor over `num_episodes` complete episodes without learning.
pub fn evaluate<E, T>(env: &mut E, actor: &mut T, num_episodes: u64) -> EvalSummary
where
    E: Environment + ?Sized,
    T: Actor<E::Observation, E::Action> + ?Sized,
{
    assert!(num_episodes > 0, "num_episodes must be positive");
    let mut total_reward = 0.0;
    let mut total_length = 0u64;
    for _ in 0..num_episodes {
        actor.reset();
        let mut observation = env.reset();
        loop {
            let action = actor.act(&observation);
            let (next_observation, reward, episode_done) = env.step(&action);
            total_reward += reward;
            total_length += 1;
            if episode_done {
                break;
            }
            observation = match next_observation {
                Some(next) => next,
                None => break,
            };
        }
    }
    EvalSummary {
        num_episodes,
        mean_reward: total_reward / num_episodes as f64,
        mean_length: total_length as f64 / num_episodes as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::DeterministicBandit;
    use crate::logging::LogError;

    /// Agent that always takes a fixed action and counts its updates.
    struct FixedActionAgent {
        action: usize,
        updates: u64,
        episode_resets: u64,
    }

    impl FixedActionAgent {
        const fn new(action: usize) -> Self {
            Self {
                action,
                updates: 0,
                episode_resets: 0,
            }
        }
    }

    impl Actor<usize, usize> for FixedActionAgent {
        fn act(&mut self, _observation: &usize) -> usize {
            self.action
        }

        fn reset(&mut self) {
            self.episode_resets += 1;
        }
    }

    impl Agent<usize, usize> for FixedActionAgent {
        fn update(&mut self, step: Step<usize, usize>, _logger: &mut dyn Logger) {
            assert_eq!(step.action, self.action);
            assert!(step.episode_done);
            self.updates += 1;
        }
    }

    /// Hook that stops training after a fixed number of steps.
    struct StopAfter(u64);

    impl<M: ?Sized> TrainingHook<M> for StopAfter {
        fn on_step(&mut self, _: &M, status: &StepStatus, _: &mut dyn Logger) -> bool {
            status.steps_seen < self.0
        }
    }

    /// Logger that counts episode-event completions.
    #[derive(Default)]
    struct EpisodeCounter(u64);

    impl Logger for EpisodeCounter {
        fn log<'a>(&mut self, _: Event, _: &'a str, _: crate::logging::Loggable) -> Result<(), LogError<'a>> {
            Ok(())
        }

        fn done(&mut self, event: Event) {
            if event == Event::Episode {
                self.0 += 1;
            }
        }
    }

    #[test]
    fn learn_runs_for_max_steps() {
        let mut env = DeterministicBandit::from_values(vec![0.0, 1.0]);
        let mut agent = FixedActionAgent::new(1);
        let mut logger = EpisodeCounter::default();
        learn(&mut env, &mut agent, 10, &mut (), &mut logger);

        // One-step episodes: one update and one episode per step.
        assert_eq!(agent.updates, 10);
        assert_eq!(agent.episode_resets, 10);
        assert_eq!(logger.0, 10);
    }

    #[test]
    fn learn_stops_when_hook_requests() {
        let mut env = DeterministicBandit::from_values(vec![0.0, 1.0]);
        let mut agent = FixedActionAgent::new(0);
        let mut hook = StopAfter(3);
        learn(&mut env, &mut agent, 100, &mut hook, &mut ());
        assert_eq!(agent.updates, 3);
    }

    #[test]
    fn evaluate_reports_mean_reward() {
        let mut env = DeterministicBandit::from_values(vec![0.25, 0.75]);
        let mut actor = FixedActionAgent::new(1);
        let summary = evaluate(&mut env, &mut actor, 4);
        assert_eq!(
            summary,
            EvalSummary {
                num_episodes: 4,
                mean_reward: 0.75,
                mean_length: 1.0,
            }
        );
        // Evaluation never updates the agent.
        assert_eq!(actor.updates, 0);
    }
}
