//! Best-model checkpointing based on rolling training reward.
use crate::agents::ModelStore;
use crate::error::StorageError;
use crate::hooks::{StepStatus, TrainingHook};
use crate::logging::{Event, Logger};
use crate::results::{self, LogReadError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of most recent episodes averaged for the improvement test.
const ROLLING_WINDOW: usize = 100;

/// Name of the save-target directory inside the log directory.
pub const BEST_MODEL_DIR: &str = "best_model";

/// How much progress reporting the checkpointer emits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Silent,
    #[default]
    Informative,
}

/// Error from a single evaluate-and-save attempt.
///
/// Never propagated out of the training loop; the step hook reports it and
/// retries at the next cadence boundary.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error(transparent)]
    LogRead(#[from] LogReadError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Saves the model whenever the rolling mean episode reward improves.
///
/// Every `check_interval` training steps, reads the episode log under the
/// log directory, averages the rewards of the most recent episodes (at most
/// 100), and persists the model to `<log_dir>/best_model` when that mean
/// strictly exceeds the best mean seen so far.
///
/// The episode log is written independently by a
/// [`Monitor`](crate::monitor::Monitor) wrapping the training environment;
/// re-reading it each check keeps this policy decoupled from how episodes
/// complete.
#[derive(Debug)]
pub struct BestModelCheckpointer {
    check_interval: u64,
    log_dir: PathBuf,
    save_path: PathBuf,
    best_mean_reward: f64,
    verbosity: Verbosity,
}

impl BestModelCheckpointer {
    /// Create a checkpointer saving to `<log_dir>/best_model`.
    ///
    /// Creates the save directory, and any missing parents, if it does not
    /// already exist.
    ///
    /// # Panics
    /// If `check_interval` is zero.
    pub fn new(
        check_interval: u64,
        log_dir: impl Into<PathBuf>,
        verbosity: Verbosity,
    ) -> Result<Self, StorageError> {
        assert!(check_interval > 0, "check_interval must be positive");
        let log_dir = log_dir.into();
        let save_path = log_dir.join(BEST_MODEL_DIR);
        fs::create_dir_all(&save_path).map_err(|source| StorageError::CreateDir {
            path: save_path.clone(),
            source,
        })?;
        Ok(Self {
            check_interval,
            log_dir,
            save_path,
            best_mean_reward: f64::NEG_INFINITY,
            verbosity,
        })
    }

    /// Best rolling mean episode reward seen so far.
    ///
    /// `-inf` until the first successful check of a non-empty episode log.
    pub fn best_mean_reward(&self) -> f64 {
        self.best_mean_reward
    }

    /// Directory the best model is saved to.
    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// Run one evaluate-and-maybe-save pass.
    ///
    /// Reads the episode log, averages the most recent rewards, and saves the
    /// model if the mean strictly improves on the best seen so far. An empty
    /// episode log is not an error; the check is skipped without any state
    /// change.
    pub fn check<M>(
        &mut self,
        model: &M,
        num_timesteps: u64,
        logger: &mut dyn Logger,
    ) -> Result<(), CheckpointError>
    where
        M: ModelStore + ?Sized,
    {
        let records = results::load_results(&self.log_dir)?;
        if records.is_empty() {
            return Ok(());
        }
        let recent = &records[records.len().saturating_sub(ROLLING_WINDOW)..];
        let mean_reward = recent.iter().map(|r| r.reward).sum::<f64>() / recent.len() as f64;

        if self.verbosity == Verbosity::Informative {
            let _ = logger.log(Event::Check, "num_timesteps", (num_timesteps as f64).into());
            let _ = logger.log(Event::Check, "best_mean_reward", self.best_mean_reward.into());
            let _ = logger.log(Event::Check, "mean_reward", mean_reward.into());
        }

        if mean_reward > self.best_mean_reward {
            self.best_mean_reward = mean_reward;
            if self.verbosity == Verbosity::Informative {
                let _ = logger.log(
                    Event::Check,
                    "save",
                    format!("saving new best model to {}", self.save_path.display()).into(),
                );
            }
            model.save(&self.save_path)?;
        }
        Ok(())
    }
}

impl<M: ModelStore + ?Sized> TrainingHook<M> for BestModelCheckpointer {
    fn on_step(&mut self, model: &M, status: &StepStatus, logger: &mut dyn Logger) -> bool {
        if status.steps_seen % self.check_interval == 0 {
            if let Err(error) = self.check(model, status.num_timesteps, logger) {
                // Checkpointing failures never abort training; retried at the
                // next cadence boundary.
                let _ = logger.log(Event::Check, "error", error.to_string().into());
            }
            logger.done(Event::Check);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    /// Model that records save requests and writes a marker file.
    #[derive(Default)]
    struct ProbeModel {
        saves: RefCell<Vec<PathBuf>>,
    }

    impl ProbeModel {
        fn save_count(&self) -> usize {
            self.saves.borrow().len()
        }
    }

    impl ModelStore for ProbeModel {
        fn save(&self, path: &Path) -> Result<(), StorageError> {
            fs::write(path.join("probe"), b"model").map_err(|source| {
                StorageError::WriteFile {
                    path: path.to_owned(),
                    source,
                }
            })?;
            self.saves.borrow_mut().push(path.to_owned());
            Ok(())
        }
    }

    fn write_monitor_file(dir: &Path, rewards: &[f64]) {
        let mut file = File::create(dir.join("training.monitor.csv")).unwrap();
        writeln!(file, "#{{\"t_start\": 0.0, \"env_id\": \"test\"}}").unwrap();
        writeln!(file, "r,l,t").unwrap();
        for (i, reward) in rewards.iter().enumerate() {
            writeln!(file, "{},{},{}", reward, 10, i).unwrap();
        }
    }

    fn status(steps_seen: u64) -> StepStatus {
        StepStatus {
            steps_seen,
            num_timesteps: steps_seen,
            episode_done: false,
        }
    }

    #[test]
    fn creates_save_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("run");
        let checkpointer =
            BestModelCheckpointer::new(5000, &log_dir, Verbosity::Silent).unwrap();
        assert!(log_dir.join(BEST_MODEL_DIR).is_dir());
        assert_eq!(checkpointer.best_mean_reward(), f64::NEG_INFINITY);
    }

    #[test]
    fn fails_when_save_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(BEST_MODEL_DIR), b"not a directory").unwrap();
        assert!(matches!(
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent),
            Err(StorageError::CreateDir { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "check_interval must be positive")]
    fn zero_interval_panics() {
        let dir = tempfile::tempdir().unwrap();
        let _ = BestModelCheckpointer::new(0, dir.path(), Verbosity::Silent);
    }

    #[rstest]
    #[case(1)]
    #[case(4999)]
    #[case(5001)]
    #[case(9999)]
    fn off_cadence_is_a_no_op(#[case] steps_seen: u64) {
        let dir = tempfile::tempdir().unwrap();
        write_monitor_file(dir.path(), &[3.2; 10]);
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();

        assert!(checkpointer.on_step(&model, &status(steps_seen), &mut ()));
        assert_eq!(model.save_count(), 0);
        assert_eq!(checkpointer.best_mean_reward(), f64::NEG_INFINITY);
    }

    #[test]
    fn first_trigger_saves_on_any_mean() {
        let dir = tempfile::tempdir().unwrap();
        write_monitor_file(dir.path(), &[3.2; 10]);
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();

        assert!(checkpointer.on_step(&model, &status(5000), &mut ()));
        assert_eq!(model.save_count(), 1);
        assert_eq!(checkpointer.best_mean_reward(), 3.2);
        assert!(dir.path().join(BEST_MODEL_DIR).join("probe").is_file());
    }

    #[test]
    fn no_save_when_mean_does_not_improve() {
        let dir = tempfile::tempdir().unwrap();
        write_monitor_file(dir.path(), &[3.2; 10]);
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();
        checkpointer.on_step(&model, &status(5000), &mut ());

        write_monitor_file(dir.path(), &[2.9; 10]);
        assert!(checkpointer.on_step(&model, &status(10000), &mut ()));
        assert_eq!(model.save_count(), 1);
        assert_eq!(checkpointer.best_mean_reward(), 3.2);
    }

    #[test]
    fn repeated_trigger_without_new_episodes_saves_once() {
        let dir = tempfile::tempdir().unwrap();
        write_monitor_file(dir.path(), &[1.5; 20]);
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();

        checkpointer.on_step(&model, &status(5000), &mut ());
        checkpointer.on_step(&model, &status(10000), &mut ());
        assert_eq!(model.save_count(), 1);
        assert_eq!(checkpointer.best_mean_reward(), 1.5);
    }

    #[test]
    fn empty_log_skips_without_error() {
        let dir = tempfile::tempdir().unwrap();
        write_monitor_file(dir.path(), &[]);
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();

        assert!(checkpointer.on_step(&model, &status(5000), &mut ()));
        assert_eq!(model.save_count(), 0);
        assert_eq!(checkpointer.best_mean_reward(), f64::NEG_INFINITY);

        // The next trigger proceeds normally once episodes exist.
        write_monitor_file(dir.path(), &[2.0; 5]);
        assert!(checkpointer.on_step(&model, &status(10000), &mut ()));
        assert_eq!(model.save_count(), 1);
        assert_eq!(checkpointer.best_mean_reward(), 2.0);
    }

    #[test]
    fn missing_log_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();

        // No monitor file exists yet; the check is skipped, not fatal.
        assert!(checkpointer.on_step(&model, &status(5000), &mut ()));
        assert_eq!(model.save_count(), 0);

        write_monitor_file(dir.path(), &[1.0; 3]);
        assert!(checkpointer.on_step(&model, &status(10000), &mut ()));
        assert_eq!(model.save_count(), 1);
    }

    #[test]
    fn mean_uses_at_most_last_100_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let mut rewards = vec![10.0; 50];
        rewards.extend(vec![1.0; 100]);
        write_monitor_file(dir.path(), &rewards);
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();

        checkpointer.on_step(&model, &status(5000), &mut ());
        assert_eq!(checkpointer.best_mean_reward(), 1.0);
    }

    #[test]
    fn best_mean_reward_is_monotone() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpointer =
            BestModelCheckpointer::new(1, dir.path(), Verbosity::Silent).unwrap();
        let model = ProbeModel::default();

        let mut best_so_far = f64::NEG_INFINITY;
        for (step, mean) in [(1, 2.0), (2, 5.0), (3, 3.0), (4, 5.5), (5, 0.5)] {
            write_monitor_file(dir.path(), &[mean; 10]);
            checkpointer.on_step(&model, &status(step), &mut ());
            assert!(checkpointer.best_mean_reward() >= best_so_far);
            best_so_far = checkpointer.best_mean_reward();
        }
        assert_eq!(best_so_far, 5.5);
        assert_eq!(model.save_count(), 3);
    }

    #[test]
    fn save_failure_does_not_abort_training() {
        use std::io;

        /// Model whose saves always fail.
        struct FailingModel;
        impl ModelStore for FailingModel {
            fn save(&self, path: &Path) -> Result<(), StorageError> {
                Err(StorageError::WriteFile {
                    path: path.to_owned(),
                    source: io::Error::new(io::ErrorKind::Other, "disk full"),
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write_monitor_file(dir.path(), &[1.0; 5]);
        let mut checkpointer =
            BestModelCheckpointer::new(5000, dir.path(), Verbosity::Silent).unwrap();

        assert!(checkpointer.on_step(&FailingModel, &status(5000), &mut ()));
        // The improved mean was still recorded; no automatic retry.
        assert_eq!(checkpointer.best_mean_reward(), 1.0);
    }
}
