//! Run configuration.
use crate::checkpoint::Verbosity;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Configuration of the optical network routing environment.
///
/// The simulation itself is external; this is the surface a run passes to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkEnvConfig {
    /// Traffic requests per episode.
    pub episode_length: u64,
    /// Offered traffic load in Erlangs.
    pub load: f64,
    /// Mean holding time of an accepted service, in time units.
    pub mean_service_holding_time: f64,
    /// Number of candidate paths considered per routing decision.
    pub k_paths: u32,
    /// Index of the network topology to simulate.
    pub topology_num: u32,
}

impl Default for NetworkEnvConfig {
    fn default() -> Self {
        Self {
            episode_length: 5000,
            load: 1.0,
            mean_service_holding_time: 10.0,
            k_paths: 2,
            topology_num: 0,
        }
    }
}

/// Compute device for model training.
///
/// Passed explicitly rather than detected from the process environment so two
/// runs in one process can use different devices.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Cpu,
    Cuda(u32),
}

/// Full configuration of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Environment configuration.
    pub env: NetworkEnvConfig,
    /// Directory holding monitor files and the saved best model.
    pub log_dir: PathBuf,
    /// Training steps between checkpointer evaluations.
    pub check_interval: u64,
    /// Checkpointer progress reporting.
    pub verbosity: Verbosity,
    /// Compute device.
    pub device: Device,
    /// Discount factor applied to future rewards.
    pub discount_factor: f64,
    /// Total environment steps to train for.
    pub total_timesteps: u64,
    /// Episodes used by the post-training evaluation.
    pub n_eval_episodes: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            env: NetworkEnvConfig::default(),
            log_dir: PathBuf::from("tmp/gym"),
            check_interval: 5000,
            verbosity: Verbosity::Informative,
            device: Device::Cpu,
            discount_factor: 0.95,
            total_timesteps: 10_000,
            n_eval_episodes: 10,
        }
    }
}

impl RunConfig {
    /// Write this configuration to `path` as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| StorageError::CreateFile {
            path: path.to_owned(),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a configuration previously written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StorageError::ReadFile {
            path: path.to_owned(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_driver() {
        let config = RunConfig::default();
        assert_eq!(config.env.episode_length, 5000);
        assert_eq!(config.env.k_paths, 2);
        assert_eq!(config.check_interval, 5000);
        assert_eq!(config.verbosity, Verbosity::Informative);
        assert_eq!(config.device, Device::Cpu);
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let config = RunConfig {
            env: NetworkEnvConfig {
                load: 0.8,
                topology_num: 3,
                ..NetworkEnvConfig::default()
            },
            device: Device::Cuda(0),
            verbosity: Verbosity::Silent,
            ..RunConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_env_fields_take_defaults() {
        let config: NetworkEnvConfig = serde_json::from_str("{\"load\": 0.5}").unwrap();
        assert_eq!(config.load, 0.5);
        assert_eq!(config.episode_length, 5000);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RunConfig::load(dir.path().join("nope.json")),
            Err(StorageError::ReadFile { .. })
        ));
    }
}
