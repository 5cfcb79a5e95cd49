//! Environment wrapper that records completed-episode statistics.
use crate::envs::{EnvStructure, Environment, StepInfo, StructuredEnvironment};
use crate::error::StorageError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// File name suffix of monitor episode logs.
pub const MONITOR_EXT: &str = "monitor.csv";

/// JSON header written as the first line of a monitor file, `#`-prefixed.
#[derive(Serialize)]
struct MonitorHeader<'a> {
    t_start: f64,
    env_id: &'a str,
}

/// Environment wrapper that appends one record per completed episode to a
/// `<prefix>.monitor.csv` file.
///
/// Each record holds the episode's cumulative reward, its length in steps,
/// the wall-clock seconds since the monitor was created, and the values of
/// any configured info keywords taken from the episode's final step.
///
/// The record file is append-only and flushed per episode so concurrent
/// readers (such as [`BestModelCheckpointer`]) always see complete records.
///
/// [`BestModelCheckpointer`]: crate::checkpoint::BestModelCheckpointer
pub struct Monitor<E> {
    env: E,
    writer: csv::Writer<File>,
    path: PathBuf,
    info_keywords: Vec<&'static str>,
    t_start: Instant,
    episode_reward: f64,
    episode_length: u64,
}

impl<E: Environment> Monitor<E> {
    /// Wrap `env`, recording episodes to `<path_prefix>.monitor.csv`.
    ///
    /// Truncates any existing file at that path. Parent directories are
    /// created as needed.
    pub fn new(
        env: E,
        path_prefix: impl AsRef<Path>,
        env_id: &str,
        info_keywords: &[&'static str],
    ) -> Result<Self, StorageError> {
        let path = monitor_path(path_prefix.as_ref());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                    path: parent.to_owned(),
                    source,
                })?;
            }
        }
        let mut file = File::create(&path).map_err(|source| StorageError::CreateFile {
            path: path.clone(),
            source,
        })?;

        let header = MonitorHeader {
            t_start: unix_time(),
            env_id,
        };
        let header_json = serde_json::to_string(&header)?;
        writeln!(file, "#{}", header_json).map_err(|source| StorageError::WriteFile {
            path: path.clone(),
            source,
        })?;

        let mut writer = csv::Writer::from_writer(file);
        let mut columns = vec!["r", "l", "t"];
        columns.extend_from_slice(info_keywords);
        writer
            .write_record(&columns)
            .and_then(|()| writer.flush().map_err(Into::into))
            .map_err(|source| StorageError::WriteRecord {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            env,
            writer,
            path,
            info_keywords: info_keywords.to_vec(),
            t_start: Instant::now(),
            episode_reward: 0.0,
            episode_length: 0,
        })
    }

    /// The monitor file this wrapper writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    fn write_record(&mut self, info: &StepInfo) -> Result<(), StorageError> {
        let mut fields = vec![
            self.episode_reward.to_string(),
            self.episode_length.to_string(),
            format!("{:.6}", self.t_start.elapsed().as_secs_f64()),
        ];
        for keyword in &self.info_keywords {
            fields.push(
                info.get(keyword)
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            );
        }
        self.writer
            .write_record(&fields)
            .and_then(|()| self.writer.flush().map_err(Into::into))
            .map_err(|source| StorageError::WriteRecord {
                path: self.path.clone(),
                source,
            })
    }
}

impl<E: Environment> Environment for Monitor<E> {
    type Observation = E::Observation;
    type Action = E::Action;

    fn reset(&mut self) -> Self::Observation {
        // Any partial episode is discarded, not recorded.
        self.episode_reward = 0.0;
        self.episode_length = 0;
        self.env.reset()
    }

    fn step(&mut self, action: &Self::Action) -> (Option<Self::Observation>, f64, bool) {
        let (next_observation, reward, episode_done) = self.env.step(action);
        self.episode_reward += reward;
        self.episode_length += 1;
        if episode_done {
            let info = self.env.step_info();
            if let Err(error) = self.write_record(&info) {
                // Recording must not abort training.
                eprintln!("monitor: failed to record episode: {}", error);
            }
            self.episode_reward = 0.0;
            self.episode_length = 0;
        }
        (next_observation, reward, episode_done)
    }

    fn step_info(&self) -> StepInfo {
        self.env.step_info()
    }
}

impl<E: StructuredEnvironment> StructuredEnvironment for Monitor<E> {
    type ObservationSpace = E::ObservationSpace;
    type ActionSpace = E::ActionSpace;

    fn structure(&self) -> EnvStructure<Self::ObservationSpace, Self::ActionSpace> {
        self.env.structure()
    }
}

/// Monitor file path for a path prefix: `<prefix>.monitor.csv`.
fn monitor_path(prefix: &Path) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(".");
    name.push(MONITOR_EXT);
    PathBuf::from(name)
}

fn unix_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
