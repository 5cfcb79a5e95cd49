//! Training-loop step hooks.
use crate::logging::Logger;

/// Progress counters passed to a hook on each training step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    /// Number of step-hook invocations so far; 1 on the first step.
    pub steps_seen: u64,
    /// Total environment timesteps taken by the trainer.
    pub num_timesteps: u64,
    /// Whether this step completed an episode.
    pub episode_done: bool,
}

/// A callback invoked once per training step.
///
/// `M` is the model being trained; hooks that persist or inspect the model
/// bound it with the capabilities they need
/// (e.g. [`ModelStore`](crate::agents::ModelStore)).
pub trait TrainingHook<M: ?Sized> {
    /// Call the hook on the current step.
    ///
    /// # Returns
    /// Whether training should continue after this step.
    fn on_step(&mut self, model: &M, status: &StepStatus, logger: &mut dyn Logger) -> bool;
}

impl<M: ?Sized> TrainingHook<M> for () {
    fn on_step(&mut self, _: &M, _: &StepStatus, _: &mut dyn Logger) -> bool {
        true
    }
}

// For a tuple of hooks, continue only if all hooks allow continuing.

impl<M: ?Sized, A, B> TrainingHook<M> for (A, B)
where
    A: TrainingHook<M>,
    B: TrainingHook<M>,
{
    fn on_step(&mut self, model: &M, status: &StepStatus, logger: &mut dyn Logger) -> bool {
        self.0.on_step(model, status, logger) && self.1.on_step(model, status, logger)
    }
}

impl<M: ?Sized, A, B, C> TrainingHook<M> for (A, B, C)
where
    A: TrainingHook<M>,
    B: TrainingHook<M>,
    C: TrainingHook<M>,
{
    fn on_step(&mut self, model: &M, status: &StepStatus, logger: &mut dyn Logger) -> bool {
        self.0.on_step(model, status, logger)
            && self.1.on_step(model, status, logger)
            && self.2.on_step(model, status, logger)
    }
}
